//! Spawning of async `perform` operations
//!
//! The engine never manages threads itself: it hands `perform` futures to a
//! tokio runtime through [`Tasks`]. A cancellation token is carried along so a
//! host can drop every pending operation when its session ends; a cancelled
//! operation never applies its follow-up action.
//!
//! # Example
//!
//! ```ignore
//! let tasks = Tasks::current().with_cancellation(shutdown.child_token());
//! let session = Session::push(PushMode::Automatic).0.with_tasks(tasks);
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Spawns async operations and tracks the ones still running.
#[derive(Debug, Clone)]
pub struct Tasks {
    handle: Option<Handle>,
    cancel: CancellationToken,
    in_flight: Arc<AtomicUsize>,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::current()
    }
}

impl Tasks {
    /// Spawn onto the runtime the caller is running in, if any.
    pub fn current() -> Self {
        Self::from_handle(Handle::try_current().ok())
    }

    /// Spawn onto a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self::from_handle(Some(handle))
    }

    /// No runtime: async actions are refused.
    pub fn detached() -> Self {
        Self::from_handle(None)
    }

    fn from_handle(handle: Option<Handle>) -> Self {
        Self {
            handle,
            cancel: CancellationToken::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Use `token` to cancel pending operations.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Whether operations can be spawned.
    pub fn is_available(&self) -> bool {
        self.handle.is_some()
    }

    /// Number of operations that have been spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Cancel every pending operation, and every operation spawned later.
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Spawn `future`, dropping it unfinished if the token is cancelled.
    ///
    /// Returns `None` when no runtime is available.
    pub(crate) fn spawn<F>(&self, name: &'static str, future: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.handle.as_ref()?;
        let cancel = self.cancel.clone();
        let guard = InFlight::enter(&self.in_flight);

        debug!(action = name, "Starting async operation");
        Some(handle.spawn(async move {
            let _guard = guard;
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(action = name, "Async operation cancelled before completion");
                }
                _ = future => {}
            }
        }))
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[test]
    fn test_detached_cannot_spawn() {
        let tasks = Tasks::detached();
        assert!(!tasks.is_available());
        assert!(tasks.spawn("noop", async {}).is_none());
        assert_eq!(tasks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_spawn_runs_future() {
        let tasks = Tasks::current();
        assert!(tasks.is_available());

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = tasks
            .spawn("flag", async move { flag.store(true, Ordering::SeqCst) })
            .expect("runtime available");

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("timeout")
            .expect("task panicked");
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(tasks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_tracks_pending() {
        let tasks = Tasks::current();
        let handle = tasks
            .spawn("sleep", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
            })
            .expect("runtime available");

        assert_eq!(tasks.in_flight(), 1);
        handle.abort();
        let _ = handle.await;
        assert_eq!(tasks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_drops_pending() {
        let tasks = Tasks::current();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let handle = tasks
            .spawn("slow", async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
            })
            .expect("runtime available");

        tasks.cancel_all();
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("timeout")
            .expect("task panicked");

        assert!(!finished.load(Ordering::SeqCst));
        assert!(tasks.is_cancelled());
    }

    #[tokio::test]
    async fn test_shared_token_cancels_clones() {
        let token = CancellationToken::new();
        let tasks = Tasks::current().with_cancellation(token.clone());
        let clone = tasks.clone();

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
