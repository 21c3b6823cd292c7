#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # pgstat-query
//!
//! Declarative query trees over PostgreSQL's internal state views (`pg_stat_activity`,
//! `pg_locks`, `pg_stat_user_tables` and friends), compiled into one nested SQL statement.
//!
//! ## Overview
//!
//! A [`Queryable`] names a relation and the columns to read from it, and may carry children
//! joined under it. Compiling the tree produces a single `SELECT` where every joined child
//! becomes a `LEFT JOIN` subquery aggregated into a JSON array column on its parent, so one
//! round trip returns e.g. each backend together with the locks it holds.
//!
//! Only ordered pairs listed in the join registry can be joined, and the set of views and
//! columns depends on the server generation (9.6 or 13), chosen once per process or passed
//! explicitly.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - Targets, the join registry, query trees, and the compiler
//! - [`schema`] - Per-generation column lists
//! - [`version`] - The set-once server version gate
//! - [`views`] - Ready-made queryables for one generation
//! - [`runner`] - Compile-and-execute entry points
//! - [`database`] - Executor trait, cancellation, and connection pooling
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use pgstat_query::{PostgresVersion, Views};
//!
//! let views = Views::for_version(PostgresVersion::Postgres13);
//! let tree = views
//!     .stat_activity
//!     .with_filter("pg_stat_activity.state = 'active'")
//!     .with_children([views.locks.clone(), views.blocking_pids()]);
//!
//! let sql = tree.to_sql().unwrap();
//! assert!(sql.starts_with("SELECT pg_stat_activity."));
//! assert!(sql.contains("GROUP BY"));
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod query_builder;
pub mod runner;
pub mod schema;
pub mod version;
pub mod views;

pub use config::QueryConfig;
pub use database::{CancelHandle, DatabaseConnection, QueryContext, QueryExecutor};
pub use error::{ExecutionError, QueryError, Result};
pub use query_builder::{compile, Queryable, Target};
pub use runner::{QueryRunner, TupleArgs};
pub use schema::Specifier;
pub use version::{
    postgres_version, set_postgres_version, PostgresVersion, VersionGate,
    DEFAULT_POSTGRES_VERSION,
};
pub use views::Views;
