use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiKey;
use crate::error::UpstreamError;

const BODY_SNIPPET_LEN: usize = 200;

/// POSTs `body` as JSON with bearer auth and decodes a 2xx reply as `R`.
pub(crate) async fn post_json<B, R>(
    http: &Client,
    url: &str,
    api_key: &ApiKey,
    body: &B,
) -> Result<R, UpstreamError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = http
        .post(url)
        .bearer_auth(api_key.expose())
        .header("User-Agent", crate::USER_AGENT)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        warn!(%url, %status, "upstream returned error status");
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: snippet(&text).to_string(),
        });
    }

    debug!(%url, bytes = text.len(), "upstream call complete");
    serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed(e.to_string()))
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
