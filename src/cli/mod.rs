use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::app;
use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, Datastore, MemoryDatastore, PgDatastore};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "store-admin")]
#[command(about = "Store Admin - multi-tenant catalog management API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides configuration")]
        port: Option<u16>,

        #[arg(long, help = "Use a process-local datastore instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Issue a session token for a caller identifier")]
    Token {
        #[arg(long, help = "Caller identifier placed in the token subject")]
        user: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = crate::config::config().clone();
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve { port: None, in_memory: false }) {
        Commands::Serve { port, in_memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, in_memory).await
        }
        Commands::Migrate => {
            let pool = connect(&config).await?;
            DatabaseManager::migrate(&pool).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Commands::Token { user } => {
            let identity = IdentityProvider::from_config(&config.security)?;
            println!("{}", identity.issue(&user)?);
            Ok(())
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let url = DatabaseManager::database_url()?;
    tracing::info!("Connecting to {}", DatabaseManager::redact(&url)?);
    Ok(DatabaseManager::connect(&url, &config.database).await?)
}

async fn serve(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    tracing::info!("Starting Store Admin in {:?} mode", config.environment);

    let datastore: Arc<dyn Datastore> = if in_memory {
        tracing::warn!("Using in-memory datastore; data is lost on shutdown");
        Arc::new(MemoryDatastore::new())
    } else {
        let pool = connect(&config).await?;
        DatabaseManager::migrate(&pool).await?;
        Arc::new(PgDatastore::new(pool))
    };

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, datastore)?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Store Admin listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
