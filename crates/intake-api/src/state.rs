//! Application state shared by all handlers.

use crate::services::SubmissionService;

#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,
}

impl AppState {
    pub fn new(submissions: SubmissionService) -> Self {
        Self { submissions }
    }
}
