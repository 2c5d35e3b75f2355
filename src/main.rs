use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deep_research_service::config::Config;
use deep_research_service::handlers::not_found;
use deep_research_service::middleware::cors;
use deep_research_service::routes::api;
use deep_research_service::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize research service: {:#}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting research service on port {}",
        config.server.port
    );

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors(&server_config.security))
            .wrap(Logger::default())
            .configure(api::config(server_config.server.max_json_payload_size))
            .default_service(web::route().to(not_found))
    })
    .bind((config.server.host.as_str(), config.server.port))?;

    info!(
        "Server started successfully at http://{}:{}",
        config.server.host, config.server.port
    );
    if let Some(public_url) = &config.server.public_url {
        info!("Your application is accessible at: {}", public_url);
    }

    server.workers(config.server.workers).run().await
}
