//! # Query Runner
//!
//! Compiles query trees and sends them through a [`QueryExecutor`].
//!
//! A runner is bound to one server generation. [`QueryRunner::new`] and
//! [`QueryRunner::with_context`] take it from the process-wide gate, applying the default
//! the first time; [`QueryRunner::with_version`] takes it explicitly and leaves the gate
//! alone.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pgstat_query::runner::QueryRunner;
//! use pgstat_query::PostgresVersion;
//! use sqlx::PgPool;
//!
//! #[derive(sqlx::FromRow)]
//! struct Backend {
//!     pid: i32,
//!     locks: serde_json::Value,
//! }
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = QueryRunner::with_version(pool, PostgresVersion::Postgres13);
//! let views = runner.views().clone();
//!
//! let backends: Vec<Backend> = runner
//!     .stat_activity_13("pg_stat_activity.state = 'active'", &[views.locks])
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use tracing::instrument;

use crate::database::{QueryContext, QueryExecutor};
use crate::error::{ExecutionError, QueryError, Result};
use crate::logging::{log_error, log_query_operation};
use crate::query_builder::Queryable;
use crate::version::{process_gate, PostgresVersion};
use crate::views::Views;

/// Arguments for [`QueryRunner::tuple`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleArgs {
    /// Relation name, as in `pg_stat_user_tables.relname`.
    pub rel_name: String,
    pub page: i64,
    pub tuple: i64,
}

impl TupleArgs {
    /// The row at `(page, tuple)`. Tuples addressed this way move after `VACUUM FULL`.
    pub fn to_sql(&self) -> String {
        format!(
            "SELECT row_to_json({rel}) FROM {rel} WHERE ctid = '({page},{tuple})'",
            rel = self.rel_name,
            page = self.page,
            tuple = self.tuple
        )
    }
}

/// A single query-running handle over an executor.
#[derive(Debug)]
pub struct QueryRunner<E> {
    executor: E,
    context: Option<QueryContext>,
    views: Views,
}

impl<E: QueryExecutor> QueryRunner<E> {
    pub fn new(executor: E) -> Self {
        Self::with_version(executor, process_gate().get_or_default())
    }

    /// Like [`new`](QueryRunner::new), but every query goes through the context-aware
    /// executor call.
    pub fn with_context(context: QueryContext, executor: E) -> Self {
        let mut runner = Self::new(executor);
        runner.context = Some(context);
        runner
    }

    pub fn with_version(executor: E, version: PostgresVersion) -> Self {
        Self {
            executor,
            context: None,
            views: Views::for_version(version),
        }
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn version(&self) -> PostgresVersion {
        self.views.version()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn context(&self) -> Option<&QueryContext> {
        self.context.as_ref()
    }

    /// Compile `queryable` and run it, returning the raw rows.
    #[instrument(skip(self, queryable), fields(root = %queryable.target()))]
    pub async fn fetch(&self, queryable: &Queryable) -> Result<Vec<PgRow>> {
        let sql = queryable.to_sql()?;
        let started = Instant::now();

        let rows = self
            .execute(&sql)
            .await
            .map_err(|e| QueryError::execution("querying rows", e));

        match &rows {
            Ok(rows) => log_query_operation(
                "fetch",
                queryable.target().name(),
                "ok",
                Some(started.elapsed().as_millis() as u64),
                Some(rows.len()),
                None,
            ),
            Err(e) => log_error(
                "query_runner",
                "fetch",
                &e.to_string(),
                Some(queryable.target().name()),
            ),
        }
        rows
    }

    /// The row at a physical location in `args.rel_name`, as JSON.
    #[instrument(skip(self))]
    pub async fn tuple(&self, args: &TupleArgs) -> Result<Option<serde_json::Value>> {
        let rows = self
            .execute(&args.to_sql())
            .await
            .map_err(|e| QueryError::execution("querying tuple", e))?;

        if rows.len() > 1 {
            return Err(QueryError::TupleOutOfSync {
                relation: args.rel_name.clone(),
            });
        }

        rows.first()
            .map(|row| row.try_get::<Option<serde_json::Value>, _>(0))
            .transpose()
            .map(Option::flatten)
            .map_err(|source| QueryError::RowDecode {
                stage: "scanning tuple".to_string(),
                source,
            })
    }

    pub async fn stat_activity_9<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_activity;
        self.fetch_typed(PostgresVersion::Postgres9, view, filter, joins)
            .await
    }

    pub async fn stat_activity_13<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_activity;
        self.fetch_typed(PostgresVersion::Postgres13, view, filter, joins)
            .await
    }

    pub async fn stat_replication_9<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_replication;
        self.fetch_typed(PostgresVersion::Postgres9, view, filter, joins)
            .await
    }

    pub async fn stat_replication_13<T>(
        &self,
        filter: &str,
        joins: &[Queryable],
    ) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_replication;
        self.fetch_typed(PostgresVersion::Postgres13, view, filter, joins)
            .await
    }

    pub async fn stat_user_tables_9<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_user_tables;
        self.fetch_typed(PostgresVersion::Postgres9, view, filter, joins)
            .await
    }

    pub async fn stat_user_tables_13<T>(
        &self,
        filter: &str,
        joins: &[Queryable],
    ) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.stat_user_tables;
        self.fetch_typed(PostgresVersion::Postgres13, view, filter, joins)
            .await
    }

    pub async fn locks_9<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.locks;
        self.fetch_typed(PostgresVersion::Postgres9, view, filter, joins)
            .await
    }

    pub async fn locks_13<T>(&self, filter: &str, joins: &[Queryable]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let view = &self.views.locks;
        self.fetch_typed(PostgresVersion::Postgres13, view, filter, joins)
            .await
    }

    fn require_version(&self, requested: PostgresVersion) -> Result<()> {
        let current = self.version();
        if requested != current {
            return Err(QueryError::VersionMismatch { requested, current });
        }
        Ok(())
    }

    async fn fetch_typed<T>(
        &self,
        requested: PostgresVersion,
        view: &Queryable,
        filter: &str,
        joins: &[Queryable],
    ) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        self.require_version(requested)?;

        let tree = view.with_filter(filter).with_children(joins.iter().cloned());
        let rows = self.fetch(&tree).await?;

        rows.iter()
            .map(|row| {
                T::from_row(row).map_err(|source| QueryError::RowDecode {
                    stage: format!("scanning {} row", view.target().name()),
                    source,
                })
            })
            .collect()
    }

    async fn execute(&self, sql: &str) -> std::result::Result<Vec<PgRow>, ExecutionError> {
        match &self.context {
            Some(context) => self.executor.query_with_context(context, sql).await,
            None => self.executor.query(sql).await,
        }
    }
}
