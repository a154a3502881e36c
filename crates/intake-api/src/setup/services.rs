//! Service initialization

use crate::services::SubmissionService;
use crate::state::AppState;
use anyhow::{Context, Result};
use intake_core::Config;
use intake_services::{dispatcher_from_config, NotificationDispatcher};
use std::sync::Arc;

/// Build application state with the dispatcher selected by configuration.
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let dispatcher =
        dispatcher_from_config(config).context("Failed to initialize notification dispatcher")?;
    Ok(build_state(config, dispatcher))
}

/// Build application state around an explicit dispatcher.
pub fn build_state(config: &Config, dispatcher: Arc<dyn NotificationDispatcher>) -> Arc<AppState> {
    let submissions = SubmissionService::new(config, dispatcher);

    tracing::info!(
        max_file_size_bytes = submissions.max_file_size(),
        recipients = config.to_emails().len(),
        "Submission service initialized"
    );

    Arc::new(AppState::new(submissions))
}
