use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ResearchError, Stage};
use crate::services::CompletionBackend;
use crate::utils::generate_queries_prompt;

#[derive(Clone)]
pub struct QueryGenerator {
    backend: Arc<dyn CompletionBackend>,
    max_tokens: u32,
}

impl QueryGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>, max_tokens: u32) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    /// Asks the model for `count` search queries about `topic`. Single call, no retry.
    pub async fn generate_queries(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, ResearchError> {
        if topic.trim().is_empty() {
            return Err(ResearchError::MissingTarget);
        }
        if count == 0 {
            return Err(ResearchError::Internal(
                "query count must be at least 1".to_string(),
            ));
        }

        let prompt = generate_queries_prompt(topic, count);
        let text = self
            .backend
            .complete(&prompt, self.max_tokens)
            .await
            .map_err(|e| ResearchError::upstream(Stage::QueryGeneration, e))?;

        let queries = split_queries(&text, count);
        if queries.is_empty() {
            warn!("model returned no usable search queries");
        }
        debug!(count = queries.len(), "generated search queries");
        Ok(queries)
    }
}

/// One query per non-blank line, in source order, at most `count`.
pub fn split_queries(text: &str, count: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::services::MockCompletionBackend;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case("a\nb\nc", 3, vec!["a", "b", "c"])]
    #[case("a\nb\nc\nd\ne", 3, vec!["a", "b", "c"])]
    #[case("\n\n  a  \n\n\nb\n", 3, vec!["a", "b"])]
    #[case("a\r\nb\r\n", 5, vec!["a", "b"])]
    #[case("   \n\t\n", 3, vec![])]
    #[case("only one", 1, vec!["only one"])]
    fn split_keeps_order_and_bounds(
        #[case] text: &str,
        #[case] count: usize,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(split_queries(text, count), expected);
    }

    #[tokio::test]
    async fn generate_sends_prompt_and_truncates() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete()
            .with(
                eq("Generate 2 search queries to research: coral reefs. Provide only the queries, one per line."),
                eq(200),
            )
            .times(1)
            .returning(|_, _| Ok("reef bleaching causes\n\nreef restoration\nextra".to_string()));

        let generator = QueryGenerator::new(Arc::new(backend), 200);
        let queries = generator.generate_queries("coral reefs", 2).await.unwrap();

        assert_eq!(queries, vec!["reef bleaching causes", "reef restoration"]);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_without_calling_upstream() {
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete().never();

        let generator = QueryGenerator::new(Arc::new(backend), 200);
        let result = generator.generate_queries("  ", 3).await;

        assert!(matches!(result, Err(ResearchError::MissingTarget)));
    }

    #[tokio::test]
    async fn upstream_failure_is_not_retried() {
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete().times(1).returning(|_, _| {
            Err(UpstreamError::Status {
                status: 500,
                body: "oops".into(),
            })
        });

        let generator = QueryGenerator::new(Arc::new(backend), 200);
        let result = generator.generate_queries("topic", 3).await;

        assert!(matches!(
            result,
            Err(ResearchError::Upstream {
                stage: Stage::QueryGeneration,
                ..
            })
        ));
    }
}
