use async_trait::async_trait;
use reqwest::Client;

use crate::config::SearchConfig;
use crate::error::UpstreamError;
use crate::models::upstream::{ChatMessage, ChatRequest, ChatResponse};
use crate::services::upstream::post_json;
use crate::utils::{web_search_prompt, SEARCH_SYSTEM_PROMPT};

/// Search-augmented chat API that answers a query with a summary of live results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, UpstreamError>;
}

#[derive(Clone)]
pub struct PerplexityClient {
    http: Client,
    config: SearchConfig,
}

impl PerplexityClient {
    pub fn new(http: Client, config: SearchConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SearchBackend for PerplexityClient {
    async fn search(&self, query: &str) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::system(SEARCH_SYSTEM_PROMPT),
                ChatMessage::user(web_search_prompt(query)),
            ],
        };

        let response: ChatResponse =
            post_json(&self.http, &self.endpoint(), &self.config.api_key, &request).await?;

        response
            .into_content()
            .ok_or_else(|| UpstreamError::Malformed("no chat choices".to_string()))
    }
}
