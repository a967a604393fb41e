use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// A write referenced a missing row, or a delete hit a row still referenced
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Unexpected row shape: {0}")]
    Decode(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let is_fk = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);

        if is_fk {
            DatabaseError::ForeignKey(err.to_string())
        } else {
            DatabaseError::Sqlx(err)
        }
    }
}

/// Builds the single process-wide connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Read `DATABASE_URL` from the environment
    pub fn database_url() -> Result<String, DatabaseError> {
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))
    }

    /// Open a pool sized and instrumented from configuration
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let target = Self::redact(database_url)?;

        let mut options = PgConnectOptions::from_str(database_url)?
            .log_slow_statements(
                log::LevelFilter::Warn,
                Duration::from_millis(config.slow_query_threshold_ms),
            );
        options = if config.enable_query_logging {
            options.log_statements(log::LevelFilter::Debug)
        } else {
            options.disable_statement_logging()
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!("Created database pool for: {}", target);
        Ok(pool)
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Connection target without credentials, safe for logs
    pub fn redact(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
