//! Mock Executor Implementation for Testing
//!
//! Records every statement sent through the [`QueryExecutor`] trait without needing a
//! database, and can be told to fail or to hang until cancelled.

use async_trait::async_trait;
use pgstat_query::{ExecutionError, QueryContext, QueryExecutor};
use sqlx::postgres::PgRow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which executor entry point a statement arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Plain,
    WithContext,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MockBehavior {
    /// Succeed with no rows
    #[default]
    Empty,
    /// Fail with a protocol error
    Fail,
    /// Never finish on its own
    Hang,
}

#[derive(Debug, Default)]
pub struct MockExecutorState {
    pub calls: Vec<(CallKind, String)>,
    pub behavior: MockBehavior,
}

#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    state: Arc<Mutex<MockExecutorState>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let executor = Self::default();
        executor.state.lock().unwrap().behavior = behavior;
        executor
    }

    pub fn calls(&self) -> Vec<(CallKind, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_sql(&self) -> Option<String> {
        self.calls().last().map(|(_, sql)| sql.clone())
    }

    fn record(&self, kind: CallKind, sql: &str) -> MockBehavior {
        let mut state = self.state.lock().unwrap();
        state.calls.push((kind, sql.to_string()));
        state.behavior
    }
}

async fn respond(behavior: MockBehavior) -> Result<Vec<PgRow>, sqlx::Error> {
    match behavior {
        MockBehavior::Empty => Ok(Vec::new()),
        MockBehavior::Fail => Err(sqlx::Error::Protocol("mock failure".to_string())),
        MockBehavior::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn query(&self, sql: &str) -> Result<Vec<PgRow>, ExecutionError> {
        let behavior = self.record(CallKind::Plain, sql);
        Ok(respond(behavior).await?)
    }

    async fn query_with_context(
        &self,
        context: &QueryContext,
        sql: &str,
    ) -> Result<Vec<PgRow>, ExecutionError> {
        let behavior = self.record(CallKind::WithContext, sql);
        context.run(respond(behavior)).await
    }
}
