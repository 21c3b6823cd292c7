use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool, Row};
use tracing::info;

use crate::config::QueryConfig;

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Open a pool sized and bounded by `config`.
    ///
    /// When a statement timeout is configured it is also set server-side on every new
    /// connection, so abandoned statements do not linger.
    pub async fn connect(config: &QueryConfig) -> Result<Self, sqlx::Error> {
        let statement_timeout_ms = config.statement_timeout_ms;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if let Some(ms) = statement_timeout_ms {
                        conn.execute(format!("SET statement_timeout = {ms}").as_str())
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect(&config.database_url)
            .await?;

        info!(
            max_connections = config.max_connections,
            statement_timeout_ms = ?statement_timeout_ms,
            "database pool connected"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
