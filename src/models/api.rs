use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(required, custom = "validate_target")]
    pub target: Option<String>,
}

impl SearchRequest {
    /// The research topic with surrounding whitespace removed.
    pub fn topic(&self) -> &str {
        self.target.as_deref().map(str::trim).unwrap_or_default()
    }
}

fn validate_target(target: &str) -> Result<(), ValidationError> {
    if target.trim().is_empty() {
        return Err(ValidationError::new("blank_target"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
