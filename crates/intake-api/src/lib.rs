//! Intake API Library
//!
//! HTTP surface of the project intake service: router, multipart extraction,
//! submission orchestration, error mapping and startup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{SubmissionOutcome, SubmissionService};
