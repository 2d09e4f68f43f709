use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers::AppState;

#[derive(Parser)]
#[command(name = "jobly")]
#[command(about = "Jobly - job board API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overriding PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Jobly in {:?} mode", config.environment);

    let pool = DatabaseManager::init(config)
        .await
        .context("failed to connect to the database")?;

    let result = match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Migrate => DatabaseManager::migrate(&pool).await.map_err(anyhow::Error::from),
        Commands::Serve { port } => {
            DatabaseManager::migrate(&pool).await?;
            serve(AppState::new(Arc::new(pool)), port.unwrap_or(config.api.port)).await
        }
    };

    DatabaseManager::close().await;
    result
}

async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Jobly listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
