mod bootstrap;
mod crm;
mod health;
mod search;
mod slash;

use std::time::Duration;

use anyhow::Result;
use nebo_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use nebo_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging comes up before anything else can fail loudly.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "nebo-server listening"
    );

    axum::serve(listener, app.router).with_graceful_shutdown(wait_for_shutdown(grace)).await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "nebo-server stopped"
    );

    Ok(())
}

async fn wait_for_shutdown(grace: Duration) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "could not listen for shutdown signal"
        );
        return;
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "shutdown requested, draining in-flight commands"
    );

    // Hard stop if draining outlives the grace period.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!(
            event_name = "system.server.forced_exit",
            correlation_id = "shutdown",
            "graceful shutdown window elapsed"
        );
        std::process::exit(1);
    });
}
