//! Cancellation and deadlines for network-bound work
//!
//! A [`CancelToken`] is shared between the caller that may give up (a UI,
//! a Ctrl-C handler) and the task doing the work. [`run_with_deadline`]
//! races a future against both the token and a timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

/// Why a guarded future did not finish
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The deadline passed first
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// The token was cancelled first
    #[error("cancelled")]
    Cancelled,
}

/// Cloneable cancellation flag
///
/// Cancelling any clone cancels them all. Once cancelled a token stays
/// cancelled.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel every clone of this token
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives as long as self, so this cannot resolve early.
            std::future::pending::<()>().await;
        }
    }
}

/// Run `fut` unless `token` is cancelled or `timeout` passes first
///
/// # Errors
///
/// Returns [`Interrupted::Cancelled`] if the token is (or becomes) cancelled
/// and [`Interrupted::TimedOut`] if the deadline passes. A token that is
/// already cancelled never polls `fut`.
pub async fn run_with_deadline<F>(fut: F, timeout: Duration, token: &CancelToken) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    if token.is_cancelled() {
        return Err(Interrupted::Cancelled);
    }
    tokio::select! {
        biased;
        () = token.cancelled() => Err(Interrupted::Cancelled),
        result = tokio::time::timeout(timeout, fut) => result.map_err(|_| Interrupted::TimedOut(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let token = CancelToken::new();
        let out = run_with_deadline(async { 42 }, Duration::from_secs(1), &token).await;
        assert_eq!(out, Ok(42));
    }

    #[tokio::test]
    async fn test_times_out() {
        let token = CancelToken::new();
        let limit = Duration::from_millis(10);
        let out = run_with_deadline(std::future::pending::<()>(), limit, &token).await;
        assert_eq!(out, Err(Interrupted::TimedOut(limit)));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_runs() {
        let token = CancelToken::new();
        token.cancel();
        let out = run_with_deadline(async { panic!("polled") }, Duration::from_secs(1), &token).await;
        assert_eq!(out, Err::<(), _>(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_from_another_task() {
        let token = CancelToken::new();
        let remote = token.clone();
        tokio::spawn(async move { remote.cancel() });

        let out = run_with_deadline(std::future::pending::<()>(), Duration::from_secs(30), &token).await;
        assert_eq!(out, Err(Interrupted::Cancelled));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
