use std::sync::Arc;
use std::time::Duration;

use actix_web::web::Data;
use log::{debug, error, info};

mod backend;
mod common;
mod config;
mod web;

use crate::backend::client::BackendClient;
use crate::common::content::StaticContent;
use crate::common::metrics::SiteMetrics;
use crate::config::SiteConfig;
use crate::web::server::{start_web_server, AppState};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[actix_web::main]
async fn main() {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    info!("Starting AFKAR Solar site...");

    let config = SiteConfig::from_env();
    info!("Backend API at {}", config.backend_url);

    let client = match BackendClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build backend client: {}", e);
            return;
        }
    };
    let content = match StaticContent::load(&config.content_path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to load static content: {}", e);
            return;
        }
    };
    let metrics = match SiteMetrics::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to register metrics: {}", e);
            return;
        }
    };

    let state = Data::new(AppState::new(
        Arc::new(client.clone()),
        client,
        config,
        content,
        metrics,
    ));
    info!("Application state initialized");

    // Drop dashboard sessions nobody came back for
    let sweeper_state = state.clone();
    let sweeper = tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sweeper_state.sessions.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired dashboard sessions", purged);
            }
        }
    });

    // Start the web interface; actix stops it gracefully on Ctrl+C
    info!("AFKAR Solar site is now running. Press Ctrl+C to stop.");
    if let Err(e) = start_web_server(state).await {
        error!("Web server error: {}", e);
    }

    info!("Shutting down AFKAR Solar site...");
    sweeper.abort();

    info!("AFKAR Solar site shutdown complete");
}
