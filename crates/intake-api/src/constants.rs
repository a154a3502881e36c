//! API constants

/// Intake endpoint receiving the project submission form
pub const SUBMIT_PROJECT_PATH: &str = "/api/submit-project";

/// Liveness probe
pub const HEALTH_PATH: &str = "/health";

/// Served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";
