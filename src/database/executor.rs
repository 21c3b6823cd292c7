//! The boundary between compiled SQL and a live database.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tokio::sync::watch;

use crate::error::ExecutionError;

/// Runs raw SQL text and hands back the resulting rows.
///
/// Statements are sent as-is, with no bind parameters. Implemented for [`PgPool`]; tests
/// substitute their own recording executors.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(&self, sql: &str) -> Result<Vec<PgRow>, ExecutionError>;

    /// Like [`query`](QueryExecutor::query), bounded by the context's deadline and
    /// cancellation signal.
    async fn query_with_context(
        &self,
        context: &QueryContext,
        sql: &str,
    ) -> Result<Vec<PgRow>, ExecutionError>;
}

#[async_trait]
impl QueryExecutor for PgPool {
    async fn query(&self, sql: &str) -> Result<Vec<PgRow>, ExecutionError> {
        Ok(sqlx::query(sql).fetch_all(self).await?)
    }

    async fn query_with_context(
        &self,
        context: &QueryContext,
        sql: &str,
    ) -> Result<Vec<PgRow>, ExecutionError> {
        context.run(sqlx::query(sql).fetch_all(self)).await
    }
}

/// Deadline and cancellation carried alongside a query.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    timeout: Option<Duration>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`QueryContext`] cloned from the one it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that can be cancelled through the returned handle.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let context = Self {
            timeout: None,
            cancel: Some(receiver),
        };
        (
            context,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `work` to completion unless the deadline passes or the context is cancelled
    /// first. A losing `work` future is dropped, which aborts the in-flight call.
    pub async fn run<F, T>(&self, work: F) -> Result<T, ExecutionError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        if self.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, work)
                    .await
                    .map_err(|_| ExecutionError::TimedOut(limit))?
                    .map_err(ExecutionError::from),
                None => work.await.map_err(ExecutionError::from),
            }
        };

        match self.cancel.clone() {
            Some(mut receiver) => tokio::select! {
                result = bounded => result,
                _ = cancelled(&mut receiver) => Err(ExecutionError::Cancelled),
            },
            None => bounded.await,
        }
    }
}

/// Resolves once cancellation is signalled; never resolves if the handle is dropped first.
async fn cancelled(receiver: &mut watch::Receiver<bool>) {
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_context_passes_result_through() {
        let context = QueryContext::new();
        let value = tokio_test::block_on(context.run(async { Ok::<_, sqlx::Error>(7) }));
        assert_eq!(tokio_test::assert_ok!(value), 7);
    }

    #[tokio::test]
    async fn test_database_errors_are_wrapped() {
        let context = QueryContext::new();
        let err = context
            .run(async { Err::<(), _>(sqlx::Error::Protocol("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Database(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (context, handle) = QueryContext::cancellable();
        handle.cancel();

        assert!(context.is_cancelled());
        let err = context
            .run(async { Ok::<_, sqlx::Error>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_while_running() {
        let (context, handle) = QueryContext::cancellable();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let err = context
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, sqlx::Error>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (context, handle) = QueryContext::cancellable();
        drop(handle);

        let value = context
            .run(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, sqlx::Error>("done")
            })
            .await
            .unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_timeout() {
        let context = QueryContext::new().with_timeout(Duration::from_millis(10));
        let err = context
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, sqlx::Error>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::TimedOut(limit) if limit == Duration::from_millis(10)));
    }

    #[test]
    fn test_clones_share_cancellation() {
        let (context, handle) = QueryContext::cancellable();
        let clone = context.clone();
        handle.clone().cancel();
        assert!(context.is_cancelled());
        assert!(clone.is_cancelled());
    }
}
