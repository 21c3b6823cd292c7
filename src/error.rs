use std::time::Duration;

use crate::query_builder::Target;
use crate::version::PostgresVersion;

/// Errors raised while building, compiling, or running a query tree.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("queryable {queryable} is not supported in this version")]
    UnsupportedTarget { queryable: String },

    #[error("join between {from} and {to} is not supported")]
    UnsupportedJoin { from: Target, to: Target },

    #[error("converting join query for {child} under {parent}: {source}")]
    JoinFailed {
        parent: Target,
        child: Target,
        #[source]
        source: Box<QueryError>,
    },

    #[error("mutual recursion detected")]
    MutualRecursion,

    #[error("postgres version already set to {current}")]
    VersionAlreadySet { current: PostgresVersion },

    #[error("unable to run version {requested} specific action for current version {current}")]
    VersionMismatch {
        requested: PostgresVersion,
        current: PostgresVersion,
    },

    #[error("{stage}: {source}")]
    Execution {
        stage: &'static str,
        #[source]
        source: ExecutionError,
    },

    #[error("{stage}: {source}")]
    RowDecode {
        stage: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("page and tuple state got out of sync for relation {relation}")]
    TupleOutOfSync { relation: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QueryError {
    /// The innermost error beneath any `JoinFailed` wrappers.
    pub fn root_cause(&self) -> &QueryError {
        let mut current = self;
        while let QueryError::JoinFailed { source, .. } = current {
            current = source;
        }
        current
    }

    pub(crate) fn execution(stage: &'static str, source: ExecutionError) -> Self {
        QueryError::Execution { stage, source }
    }
}

/// Failures coming back from a [`QueryExecutor`](crate::database::QueryExecutor).
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query cancelled by caller")]
    Cancelled,

    #[error("query timed out after {0:?}")]
    TimedOut(Duration),
}

pub type Result<T> = std::result::Result<T, QueryError>;
