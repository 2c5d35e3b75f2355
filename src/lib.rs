pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::ResearchService;

pub const USER_AGENT: &str = concat!("deep_research_service/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct AppState {
    pub research: Arc<ResearchService>,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, research: ResearchService) -> Self {
        Self {
            research: Arc::new(research),
            config,
            start_time: Instant::now(),
        }
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let research = ResearchService::from_config(&config)?;
        Ok(Self::new(config, research))
    }
}
