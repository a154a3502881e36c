//! Intake Services Layer
//!
//! Outbound side of the intake pipeline: turns a validated submission into a
//! notification message and hands it to the configured provider. The API crate
//! only sees the [`NotificationDispatcher`] trait.

pub mod notification;

pub use notification::{
    dispatcher_from_config, render_submission, DeliveryError, DispatchReceipt, LogDispatcher,
    NotificationDispatcher, OutboundAttachment, OutboundMessage, RenderedBody,
};
#[cfg(feature = "resend")]
pub use notification::resend::ResendDispatcher;
#[cfg(feature = "smtp")]
pub use notification::smtp::SmtpDispatcher;
