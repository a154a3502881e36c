//! Test helpers: build the router around an in-memory dispatcher.
//!
//! Run from workspace root: `cargo test -p intake-api`.

#![allow(dead_code)]

pub mod dispatchers;
pub mod fixtures;

use axum_test::TestServer;
use intake_api::setup::{routes, services};
use intake_core::{Config, IntakeConfig};
use intake_services::NotificationDispatcher;
use std::collections::HashMap;
use std::sync::Arc;

pub use dispatchers::{FailingDispatcher, RecordingDispatcher};

/// Per-file cap used by the test configuration.
pub const TEST_MAX_FILE_SIZE_MB: usize = 1;

/// Build a configuration from explicit pairs on top of the test defaults.
pub fn create_test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("ENVIRONMENT", "development"),
        ("MAX_FILE_SIZE_MB", "1"),
        ("FROM_EMAIL", "Intake <intake@example.com>"),
        ("TO_EMAIL", "sales@example.com, engineering@example.com"),
        ("NOTIFICATION_PROVIDER", "log"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    Config(Box::new(
        IntakeConfig::from_source(|key| vars.get(key).cloned()).expect("test config"),
    ))
}

/// Build a test server whose submissions go to `dispatcher`.
pub fn setup_test_server(dispatcher: Arc<dyn NotificationDispatcher>) -> TestServer {
    setup_test_server_with_config(create_test_config(&[]), dispatcher)
}

pub fn setup_test_server_with_config(
    config: Config,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> TestServer {
    let state = services::build_state(&config, dispatcher);
    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}
