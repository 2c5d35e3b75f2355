use async_trait::async_trait;
use reqwest::Client;

use crate::config::InferenceConfig;
use crate::error::UpstreamError;
use crate::models::upstream::{CompletionRequest, CompletionResponse};
use crate::services::upstream::post_json;

/// Text-completion API used to write queries and the final report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, UpstreamError>;
}

#[derive(Clone)]
pub struct TogetherClient {
    http: Client,
    config: InferenceConfig,
}

impl TogetherClient {
    pub fn new(http: Client, config: InferenceConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/inference", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for TogetherClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, UpstreamError> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens,
            temperature: self.config.temperature,
        };

        let response: CompletionResponse =
            post_json(&self.http, &self.endpoint(), &self.config.api_key, &request).await?;

        response
            .into_text()
            .ok_or_else(|| UpstreamError::Malformed("no completion choices".to_string()))
    }
}
