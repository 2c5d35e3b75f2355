use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::{ResearchError, Stage, UpstreamError};
use crate::services::retry::{retry_with_backoff, AttemptObserver, RetryPolicy, TracingObserver};
use crate::services::CompletionBackend;
use crate::utils::report_prompt;

#[derive(Clone)]
pub struct ReportSynthesizer {
    backend: Arc<dyn CompletionBackend>,
    observer: Arc<dyn AttemptObserver>,
    max_tokens: u32,
    base_delay: Duration,
}

impl ReportSynthesizer {
    pub fn new(backend: Arc<dyn CompletionBackend>, max_tokens: u32, base_delay: Duration) -> Self {
        Self {
            backend,
            observer: Arc::new(TracingObserver::new("final report")),
            max_tokens,
            base_delay,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Writes the markdown report, retrying transient upstream failures with
    /// exponential backoff. A successful reply is returned as-is.
    pub async fn synthesize_report(
        &self,
        topic: &str,
        queries: &[String],
        results: &[String],
        max_attempts: u32,
    ) -> Result<String, ResearchError> {
        if queries.len() != results.len() {
            return Err(ResearchError::Internal(format!(
                "{} queries but {} search results",
                queries.len(),
                results.len()
            )));
        }

        let prompt = report_prompt(topic, queries, results);
        let policy = RetryPolicy::new(max_attempts, self.base_delay);

        let backend = self.backend.as_ref();
        let prompt = prompt.as_str();
        let max_tokens = self.max_tokens;

        let report = retry_with_backoff(policy, self.observer.as_ref(), move || {
            backend.complete(prompt, max_tokens)
        })
        .await
        .map_err(|err| {
            if matches!(err.last, UpstreamError::Malformed(_)) {
                ResearchError::upstream(Stage::Report, err.last)
            } else {
                ResearchError::ReportGeneration {
                    attempts: err.attempts,
                    source: err.last,
                }
            }
        })?;

        info!(bytes = report.len(), "final report generated");
        Ok(report)
    }
}
