//! Transaction scopes over a single session.
//!
//! A [`TransactionScope`] owns the session and counts how deeply scopes are
//! nested. Only the outermost scope issues `BEGIN` and `COMMIT`/`ROLLBACK`;
//! inner scopes join it. With [`TransactionScope::commit_after_read`]
//! enabled, reads issued outside any scope are followed by a `COMMIT` so
//! that a driver which leaves an implicit transaction open after fetching
//! does not return an idle-in-transaction connection to its pool.

use futures::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::error::{AdapterError, Result};
use crate::session::{QueryFrame, Session};

/// Reentrant transaction scope bound to one session.
#[derive(Debug)]
pub struct TransactionScope<S> {
    session: S,
    depth: usize,
    commit_after_read: bool,
}

impl<S: Session> TransactionScope<S> {
    /// Wraps a session. No transaction is opened yet.
    pub const fn new(session: S) -> Self {
        Self {
            session,
            depth: 0,
            commit_after_read: false,
        }
    }

    /// Enables the post-read commit for reads outside any scope.
    #[must_use]
    pub fn commit_after_read(mut self, enabled: bool) -> Self {
        self.commit_after_read = enabled;
        self
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns whether a scope is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.depth > 0
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns the session mutably.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Unwraps the session.
    pub fn into_inner(self) -> S {
        self.session
    }

    /// Enters a scope, opening a transaction if this is the outermost one.
    pub async fn begin(&mut self) -> Result<()> {
        if self.depth == 0 {
            self.session.begin().await?;
            debug!("Transaction opened");
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a scope with the outcome of its body.
    ///
    /// The outermost scope commits on success and rolls back on failure.
    /// Inner scopes pass the outcome through untouched.
    pub async fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        if self.depth == 0 {
            return Err(AdapterError::TransactionState(
                "finish called without an open scope".to_string(),
            ));
        }
        self.depth -= 1;
        if self.depth > 0 {
            return outcome;
        }

        match outcome {
            Ok(value) => {
                self.session.commit().await?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.session.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                } else {
                    debug!(error = %err, "Transaction rolled back");
                }
                Err(err)
            }
        }
    }

    /// Runs `body` inside a scope.
    ///
    /// ```rust,ignore
    /// scope
    ///     .with_scope(|scope| {
    ///         async move {
    ///             scope.execute("DROP VIEW v").await?;
    ///             scope.execute("CREATE VIEW v AS SELECT 1").await
    ///         }
    ///         .boxed_local()
    ///     })
    ///     .await?;
    /// ```
    pub async fn with_scope<T, F>(&mut self, body: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Self) -> LocalBoxFuture<'s, Result<T>>,
    {
        self.begin().await?;
        let outcome = body(self).await;
        self.finish(outcome).await
    }

    /// Executes a statement on the session.
    pub async fn execute(&mut self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing SQL");
        self.session.execute(sql).await
    }

    /// Runs a read query, committing afterwards when no transaction is open
    /// and the post-read commit is enabled.
    pub async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame> {
        debug!(sql = %sql, ?params, "Fetching");
        let frame = self.session.fetch(sql, params).await?;
        if self.commit_after_read && !self.session.is_transaction_active() {
            debug!("Committing implicit transaction left by read");
            self.session.commit().await?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    /// Records calls and models a driver that leaves reads in a transaction.
    #[derive(Debug, Default)]
    struct Recorder {
        log: Vec<String>,
        explicit: bool,
        implicit: bool,
        fail_on: Option<&'static str>,
    }

    impl Session for Recorder {
        async fn execute(&mut self, sql: &str) -> Result<()> {
            self.log.push(sql.to_string());
            if self.fail_on == Some(sql) {
                return Err(AdapterError::NotFound(sql.to_string()));
            }
            Ok(())
        }

        async fn fetch(&mut self, sql: &str, _params: &[&str]) -> Result<QueryFrame> {
            self.log.push(sql.to_string());
            if !self.explicit {
                self.implicit = true;
            }
            Ok(QueryFrame::default())
        }

        fn is_transaction_active(&self) -> bool {
            self.explicit
        }

        async fn begin(&mut self) -> Result<()> {
            self.log.push("BEGIN".into());
            self.explicit = true;
            Ok(())
        }

        async fn commit(&mut self) -> Result<()> {
            self.log.push("COMMIT".into());
            self.explicit = false;
            self.implicit = false;
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            self.log.push("ROLLBACK".into());
            self.explicit = false;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_outer_scope_commits_once() {
        let mut scope = TransactionScope::new(Recorder::default());
        scope.begin().await.unwrap();
        scope.begin().await.unwrap();
        scope.execute("A").await.unwrap();
        scope.finish(Ok(())).await.unwrap();
        assert_eq!(scope.depth(), 1);
        scope.finish(Ok(())).await.unwrap();
        assert!(!scope.is_active());
        assert_eq!(scope.session().log, ["BEGIN", "A", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_at_outermost_scope() {
        let session = Recorder {
            fail_on: Some("B"),
            ..Recorder::default()
        };
        let mut scope = TransactionScope::new(session);
        let result: Result<()> = scope
            .with_scope(|outer| {
                async move {
                    outer.execute("A").await?;
                    outer
                        .with_scope(|inner| async move { inner.execute("B").await }.boxed_local())
                        .await
                }
                .boxed_local()
            })
            .await;
        assert!(matches!(result, Err(AdapterError::NotFound(_))));
        assert_eq!(scope.session().log, ["BEGIN", "A", "B", "ROLLBACK"]);
        assert_eq!(scope.depth(), 0);
    }

    #[tokio::test]
    async fn test_finish_without_begin_is_an_error() {
        let mut scope = TransactionScope::new(Recorder::default());
        let result = scope.finish(Ok(())).await;
        assert!(matches!(result, Err(AdapterError::TransactionState(_))));
        assert_eq!(scope.depth(), 0);
    }

    #[tokio::test]
    async fn test_read_outside_scope_is_committed() {
        let mut scope = TransactionScope::new(Recorder::default()).commit_after_read(true);
        scope.fetch("SELECT 1", &[]).await.unwrap();
        assert!(!scope.session().implicit);
        assert!(!scope.session().is_transaction_active());
        assert_eq!(scope.session().log, ["SELECT 1", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_read_inside_scope_is_not_committed() {
        let mut scope = TransactionScope::new(Recorder::default()).commit_after_read(true);
        scope.begin().await.unwrap();
        scope.fetch("SELECT 1", &[]).await.unwrap();
        assert!(scope.session().is_transaction_active());
        scope.finish(Ok(())).await.unwrap();
        assert_eq!(scope.session().log, ["BEGIN", "SELECT 1", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_read_without_correction_leaves_implicit_transaction() {
        let mut scope = TransactionScope::new(Recorder::default());
        scope.fetch("SELECT 1", &[]).await.unwrap();
        assert!(scope.session().implicit);
    }
}
