#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr};

/// Connection settings for the primary database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Read `DATABASE_URL` and the pool bounds. `None` when no URL is set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        })
    }
}

/// Pooled connection to the blog database.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct DatabasePool {
    pub conn: DbConn,
}

#[cfg(feature = "postgres")]
impl DatabasePool {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Connecting to database...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false)
            .to_owned();

        let conn = Database::connect(opts).await?;
        tracing::info!(pool = config.max_connections, "Database connected");

        Ok(Self { conn })
    }

    /// Round-trip a trivial statement; used by the health check.
    pub async fn ping(&self) -> bool {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Database ping failed"))
            .is_ok()
    }
}
