//! Cancellable, deadline-bearing execution context.
//!
//! A [`Context`] is handed to every network operation. Cancelling it (or
//! letting its deadline pass) makes every operation running under it resolve
//! promptly with [`ClientError::Cancelled`] or [`ClientError::DeadlineExceeded`].
//! The in-flight future is dropped, which aborts the underlying request.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::client::ClientError;

/// Execution context shared by all probes of a validation run.
///
/// Cloning is cheap and clones observe the same cancellation and deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled when this one is, with an
    /// additional (earlier) deadline.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: self.token.child_token(),
            deadline: Some(match self.deadline {
                Some(parent) => parent.min(deadline),
                None => deadline,
            }),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error this context would currently produce, if it is done.
    pub fn err(&self) -> Option<ClientError> {
        if self.token.is_cancelled() {
            return Some(ClientError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ClientError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Run `fut` to completion unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            _ = expired(self.deadline) => Err(ClientError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok::<_, ClientError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = Context::background();
        ctx.cancel();
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ClientError>(())
            })
            .await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_interrupts_slow_future() {
        let ctx = Context::with_timeout(Duration::from_millis(20));
        let started = std::time::Instant::now();
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ClientError>(())
            })
            .await;
        assert!(matches!(result, Err(ClientError::DeadlineExceeded)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn child_is_cancelled_with_parent() {
        let parent = Context::background();
        let child = parent.child_with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert!(child.is_cancelled());
        assert!(matches!(child.err(), Some(ClientError::Cancelled)));
    }
}
