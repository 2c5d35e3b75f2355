use actix_web::http::Uri;
use anyhow::{bail, Context};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub search: SearchConfig,
    pub research: ResearchConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_json_payload_size: usize,
    /// Externally reachable address (e.g. a tunnel), only used for the startup log.
    pub public_url: Option<String>,
}

/// Text-completion upstream used for query generation and the final report.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub query_max_tokens: u32,
    pub report_max_tokens: u32,
}

/// Search-augmented chat upstream.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub query_count: usize,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub parallel_searches: bool,
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                workers: num_cpus::get(),
                max_json_payload_size: 65_536,
                public_url: None,
            },
            inference: InferenceConfig {
                api_key: ApiKey::default(),
                base_url: "https://api.together.xyz".to_string(),
                model: "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo".to_string(),
                temperature: 0.7,
                query_max_tokens: 200,
                report_max_tokens: 1000,
            },
            search: SearchConfig {
                api_key: ApiKey::default(),
                base_url: "https://api.perplexity.ai".to_string(),
                model: "llama-3.1-sonar-small-128k-online".to_string(),
            },
            research: ResearchConfig {
                query_count: 3,
                max_attempts: 3,
                retry_base_delay_ms: 1000,
                parallel_searches: false,
                upstream_timeout_secs: 60,
            },
            security: SecurityConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }
}

impl ResearchConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // Server configuration
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.server.port = port;
        }
        if let Some(workers) = parse_var(&lookup, "WORKERS")? {
            config.server.workers = workers;
        }
        if let Some(size) = parse_var(&lookup, "MAX_JSON_PAYLOAD_SIZE")? {
            config.server.max_json_payload_size = size;
        }
        config.server.public_url = lookup("PUBLIC_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        // Text-completion upstream
        if let Some(key) = lookup("TOGETHER_API_KEY") {
            config.inference.api_key = ApiKey::new(key.trim());
        }
        if let Some(base_url) = lookup("TOGETHER_BASE_URL") {
            config.inference.base_url = base_url;
        }
        if let Some(model) = lookup("TOGETHER_MODEL") {
            config.inference.model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "TEMPERATURE")? {
            config.inference.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&lookup, "QUERY_MAX_TOKENS")? {
            config.inference.query_max_tokens = max_tokens;
        }
        if let Some(max_tokens) = parse_var(&lookup, "REPORT_MAX_TOKENS")? {
            config.inference.report_max_tokens = max_tokens;
        }

        // Search upstream
        if let Some(key) = lookup("PERPLEXITY_API_KEY") {
            config.search.api_key = ApiKey::new(key.trim());
        }
        if let Some(base_url) = lookup("PERPLEXITY_BASE_URL") {
            config.search.base_url = base_url;
        }
        if let Some(model) = lookup("PERPLEXITY_MODEL") {
            config.search.model = model;
        }

        // Pipeline behaviour
        if let Some(count) = parse_var(&lookup, "QUERY_COUNT")? {
            config.research.query_count = count;
        }
        if let Some(attempts) = parse_var(&lookup, "MAX_ATTEMPTS")? {
            config.research.max_attempts = attempts;
        }
        if let Some(delay) = parse_var(&lookup, "RETRY_BASE_DELAY_MS")? {
            config.research.retry_base_delay_ms = delay;
        }
        if let Some(parallel) = parse_var(&lookup, "PARALLEL_SEARCHES")? {
            config.research.parallel_searches = parallel;
        }
        if let Some(timeout) = parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS")? {
            config.research.upstream_timeout_secs = timeout;
        }

        // Security configuration
        if let Some(allowed_origins) = lookup("ALLOWED_ORIGINS") {
            config.security.allowed_origins = allowed_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inference.api_key.is_empty() {
            bail!("TOGETHER_API_KEY is not set");
        }
        if self.search.api_key.is_empty() {
            bail!("PERPLEXITY_API_KEY is not set");
        }
        if self.research.query_count == 0 {
            bail!("QUERY_COUNT must be at least 1");
        }
        if self.research.max_attempts == 0 {
            bail!("MAX_ATTEMPTS must be at least 1");
        }
        if self.research.upstream_timeout_secs == 0 {
            bail!("UPSTREAM_TIMEOUT_SECS must be at least 1");
        }
        for origin in &self.security.allowed_origins {
            if origin != "*" && !is_valid_origin(origin) {
                bail!("invalid origin in ALLOWED_ORIGINS: {origin:?}");
            }
        }
        Ok(())
    }
}

/// An origin must carry both a scheme and a host, e.g. `https://app.example.com`.
fn is_valid_origin(origin: &str) -> bool {
    origin
        .parse::<Uri>()
        .map(|uri| uri.scheme().is_some() && uri.host().is_some())
        .unwrap_or(false)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}
