//! Cancellable deferred actions tied to the screen lifetime.
//!
//! Every timed action the engine schedules goes through here, so tearing the
//! screen down (cancelling its token) turns all pending actions into no-ops.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A scheduled action that may or may not fire
pub struct Deferred<T> {
    handle: JoinHandle<Option<T>>,
}

impl<T> Deferred<T> {
    /// Wait for the action. `None` if it was cancelled before firing.
    pub async fn fired(self) -> Option<T> {
        self.handle.await.ok().flatten()
    }
}

/// Schedule `action` to run `delay` from now unless `token` is cancelled first.
///
/// The deadline is fixed at call time.
pub fn defer<F, T>(token: &CancellationToken, delay: Duration, action: F) -> Deferred<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    defer_after::<F, T, ()>(token, delay, None, action)
}

/// Like [`defer`], but once the deadline passes the action also waits for
/// `previous` to fire, and is dropped if `previous` was cancelled.
///
/// Chaining each action to the one before keeps them in scheduling order
/// even when a stalled runtime wakes several of them at once.
pub fn defer_after<F, T, P>(
    token: &CancellationToken,
    delay: Duration,
    previous: Option<Deferred<P>>,
    action: F,
) -> Deferred<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
    P: Send + 'static,
{
    let deadline = Instant::now() + delay;
    let token = token.clone();
    let handle = tokio::spawn(async move {
        let due = async move {
            tokio::time::sleep_until(deadline).await;
            match previous {
                Some(previous) => previous.fired().await.is_some(),
                None => true,
            }
        };
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            ready = due => {
                if ready && !token.is_cancelled() {
                    Some(action())
                } else {
                    None
                }
            }
        }
    });
    Deferred { handle }
}

/// Sleep for `delay`, returning false if `token` was cancelled meanwhile
pub async fn pause(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => !token.is_cancelled(),
    }
}
