//! # Database Operations
//!
//! Connection management and the execution boundary compiled queries are sent through.
//!
//! ## Key Components
//!
//! - [`connection`] - Pool construction from [`QueryConfig`](crate::config::QueryConfig)
//!   and health checks
//! - [`executor`] - The [`QueryExecutor`] trait, its [`PgPool`](sqlx::PgPool)
//!   implementation, and [`QueryContext`] deadlines and cancellation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pgstat_query::config::QueryConfig;
//! use pgstat_query::database::{DatabaseConnection, QueryExecutor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QueryConfig::from_env()?;
//! let db = DatabaseConnection::connect(&config).await?;
//! let rows = db.pool().query("SELECT pid FROM pg_stat_activity").await?;
//! println!("{} backends", rows.len());
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod executor;

pub use connection::DatabaseConnection;
pub use executor::{CancelHandle, QueryContext, QueryExecutor};
