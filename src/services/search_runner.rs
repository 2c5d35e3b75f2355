use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::{ResearchError, Stage};
use crate::services::SearchBackend;

#[derive(Clone)]
pub struct SearchRunner {
    backend: Arc<dyn SearchBackend>,
    parallel: bool,
}

impl SearchRunner {
    pub fn new(backend: Arc<dyn SearchBackend>, parallel: bool) -> Self {
        Self { backend, parallel }
    }

    pub async fn run_search(&self, query: &str) -> Result<String, ResearchError> {
        debug!(%query, "running web search");
        self.backend
            .search(query)
            .await
            .map_err(|e| ResearchError::upstream(Stage::Search, e))
    }

    /// Results come back in query order. The first failure aborts the whole batch.
    pub async fn run_all(&self, queries: &[String]) -> Result<Vec<String>, ResearchError> {
        if self.parallel {
            return try_join_all(queries.iter().map(|query| self.run_search(query))).await;
        }

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            results.push(self.run_search(query).await?);
        }
        Ok(results)
    }
}
