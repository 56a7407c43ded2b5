//! Request-scoped cancellation and deadlines
//!
//! Every async trait method takes a [`Context`] first. Providers check it
//! between remote calls so a cancelled Terraform run stops promptly.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    cancel_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                cancel_tx,
            }),
        }
    }

    /// Derives a context that is considered cancelled once `timeout` has
    /// elapsed. Cancelling the parent does not propagate.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(Instant::now() + timeout),
                cancel_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if *self.inner.cancel_tx.borrow() {
            return true;
        }
        matches!(self.inner.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, if one was set.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.inner.cancel_tx.send_replace(true);
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        let mut rx = self.inner.cancel_tx.subscribe();
        let cancelled = rx.wait_for(|cancelled| *cancelled);
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = cancelled => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => {
                let _ = cancelled.await;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn context_timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));
        assert!(!ctx.is_cancelled());

        sleep(Duration::from_millis(80)).await;

        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn context_manual_cancel_wakes_waiters() {
        let ctx = Context::new();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.done().await });

        ctx.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("done() should resolve after cancel")
            .unwrap();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn context_deadline() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());

        let ctx = ctx.with_timeout(Duration::from_secs(5));
        assert!(ctx.deadline().is_some());
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
    }
}
