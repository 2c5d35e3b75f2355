use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;

pub const MISSING_TARGET_MESSAGE: &str = "No search target provided";
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failure of a single call to an upstream API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Transport-level failures worth another attempt: network errors, timeouts,
    /// throttling and server-side errors. Other 4xx responses are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Network(_) => true,
            UpstreamError::Status { status, .. } => {
                matches!(status, 408 | 429 | 500..=599)
            }
            UpstreamError::Malformed(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    QueryGeneration,
    Search,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::QueryGeneration => "query generation",
            Stage::Search => "web search",
            Stage::Report => "report generation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Client,
    Upstream,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("No search target provided")]
    MissingTarget,

    #[error("{stage} failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },

    #[error(
        "Failed to generate final report after {attempts} {noun}: {source}",
        noun = attempt_noun(.attempts)
    )]
    ReportGeneration {
        attempts: u32,
        #[source]
        source: UpstreamError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

fn attempt_noun(attempts: &u32) -> &'static str {
    if *attempts == 1 {
        "attempt"
    } else {
        "attempts"
    }
}

impl ResearchError {
    pub fn upstream(stage: Stage, source: UpstreamError) -> Self {
        match source {
            UpstreamError::Malformed(detail) => {
                ResearchError::Internal(format!("{stage} returned {detail}"))
            }
            source => ResearchError::Upstream { stage, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResearchError::MissingTarget => ErrorKind::Client,
            ResearchError::Upstream { .. } | ResearchError::ReportGeneration { .. } => {
                ErrorKind::Upstream
            }
            ResearchError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message a caller is allowed to see. Only client errors and an exhausted
    /// report generation are surfaced; everything else stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ResearchError::MissingTarget | ResearchError::ReportGeneration { .. } => {
                self.to_string()
            }
            ResearchError::Upstream { .. } | ResearchError::Internal(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl ResponseError for ResearchError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Client => StatusCode::BAD_REQUEST,
            ErrorKind::Upstream | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn status(code: u16) -> UpstreamError {
        UpstreamError::Status {
            status: code,
            body: "boom".into(),
        }
    }

    #[rstest]
    #[case(408, true)]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(401, false)]
    #[case(404, false)]
    fn status_retryability(#[case] code: u16, #[case] transient: bool) {
        assert_eq!(status(code).is_transient(), transient);
    }

    #[test]
    fn malformed_body_is_not_transient() {
        assert!(!UpstreamError::Malformed("missing choices".into()).is_transient());
    }

    #[test]
    fn missing_target_is_client_error() {
        let err = ResearchError::MissingTarget;
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), MISSING_TARGET_MESSAGE);
    }

    #[test]
    fn report_generation_message_is_surfaced_verbatim() {
        let err = ResearchError::ReportGeneration {
            attempts: 3,
            source: status(503),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.public_message(),
            "Failed to generate final report after 3 attempts: HTTP 503: boom"
        );
    }

    #[test]
    fn single_attempt_reads_singular() {
        let err = ResearchError::ReportGeneration {
            attempts: 1,
            source: status(400),
        };
        assert_eq!(
            err.public_message(),
            "Failed to generate final report after 1 attempt: HTTP 400: boom"
        );
    }

    #[test]
    fn other_upstream_failures_are_hidden() {
        let err = ResearchError::upstream(Stage::Search, status(500));
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
        assert!(err.to_string().contains("web search failed"));
    }

    #[test]
    fn malformed_upstream_body_becomes_internal() {
        let err = ResearchError::upstream(
            Stage::QueryGeneration,
            UpstreamError::Malformed("no choices".into()),
        );
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
    }
}
