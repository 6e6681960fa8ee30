mod apidoc;
mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use config::Config;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Refuse to serve anything with an incomplete configuration
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let addr = format!("{}:{}", cfg.app_host, cfg.app_port);
    info!(
        backend = cfg.backend.name(),
        news = cfg.news.is_some(),
        "Configuration loaded"
    );

    let state = AppState {
        cfg,
        http: reqwest::Client::new(),
    };
    let app = routes::app(state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {addr}: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("Chat relay listening on http://{addr}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
