use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::error::ResearchError;
use crate::services::{
    CompletionBackend, PerplexityClient, QueryGenerator, ReportSynthesizer, SearchBackend,
    SearchRunner, TogetherClient,
};
use crate::utils::render_html;

#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub queries: Vec<String>,
    pub markdown: String,
    pub html: String,
}

/// Query generation, web search and report synthesis, run in that order.
#[derive(Clone)]
pub struct ResearchService {
    generator: QueryGenerator,
    runner: SearchRunner,
    synthesizer: ReportSynthesizer,
    query_count: usize,
    max_attempts: u32,
}

impl ResearchService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.research.upstream_timeout())
            .user_agent(crate::USER_AGENT)
            .build()?;

        let completion: Arc<dyn CompletionBackend> = Arc::new(TogetherClient::new(
            http.clone(),
            config.inference.clone(),
        ));
        let search: Arc<dyn SearchBackend> =
            Arc::new(PerplexityClient::new(http, config.search.clone()));

        Ok(Self::with_backends(config, completion, search))
    }

    pub fn with_backends(
        config: &Config,
        completion: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            generator: QueryGenerator::new(completion.clone(), config.inference.query_max_tokens),
            runner: SearchRunner::new(search, config.research.parallel_searches),
            synthesizer: ReportSynthesizer::new(
                completion,
                config.inference.report_max_tokens,
                config.research.retry_base_delay(),
            ),
            query_count: config.research.query_count,
            max_attempts: config.research.max_attempts,
        }
    }

    pub async fn run(&self, topic: &str) -> Result<ResearchReport, ResearchError> {
        let queries = self
            .generator
            .generate_queries(topic, self.query_count)
            .await?;
        info!(queries = queries.len(), "search queries ready");

        let results = self.runner.run_all(&queries).await?;
        info!(results = results.len(), "web searches complete");

        let markdown = self
            .synthesizer
            .synthesize_report(topic, &queries, &results, self.max_attempts)
            .await?;

        let html = render_html(&markdown)
            .map_err(|e| ResearchError::Internal(format!("markdown rendering failed: {e}")))?;

        Ok(ResearchReport {
            queries,
            markdown,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::error::{ErrorKind, Stage, UpstreamError};
    use crate::services::{MockCompletionBackend, MockSearchBackend};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.inference.api_key = ApiKey::new("t");
        config.search.api_key = ApiKey::new("p");
        config.research.retry_base_delay_ms = 1;
        config
    }

    #[tokio::test]
    async fn pipeline_produces_html_report() {
        let mut completion = MockCompletionBackend::new();
        completion
            .expect_complete()
            .withf(|_, max_tokens| *max_tokens == 200)
            .times(1)
            .returning(|_, _| Ok("q1\nq2\nq3\nq4".to_string()));
        completion
            .expect_complete()
            .withf(|prompt, max_tokens| {
                *max_tokens == 1000
                    && prompt.contains("Query: q1\nResult: r:q1")
                    && prompt.contains("Query: q3\nResult: r:q3")
            })
            .times(1)
            .returning(|_, _| Ok("# Report\n\n- finding".to_string()));

        let mut search = MockSearchBackend::new();
        search
            .expect_search()
            .times(3)
            .returning(|q| Ok(format!("r:{q}")));

        let service =
            ResearchService::with_backends(&test_config(), Arc::new(completion), Arc::new(search));
        let report = service.run("deep sea vents").await.unwrap();

        assert_eq!(report.queries, vec!["q1", "q2", "q3"]);
        assert_eq!(report.markdown, "# Report\n\n- finding");
        assert!(report.html.contains("<h1>Report</h1>"));
        assert!(report.html.contains("<li>finding</li>"));
    }

    #[tokio::test]
    async fn search_failure_skips_synthesis() {
        let mut completion = MockCompletionBackend::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("only query".to_string()));

        let mut search = MockSearchBackend::new();
        search.expect_search().times(1).returning(|_| {
            Err(UpstreamError::Status {
                status: 500,
                body: "down".into(),
            })
        });

        let service =
            ResearchService::with_backends(&test_config(), Arc::new(completion), Arc::new(search));
        let err = service.run("topic").await.unwrap_err();

        assert!(matches!(
            err,
            ResearchError::Upstream {
                stage: Stage::Search,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
