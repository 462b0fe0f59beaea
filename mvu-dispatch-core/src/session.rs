//! Rendering sessions and the push channel
//!
//! A [`Session`] is the explicit context threaded through `bind`: the delivery
//! adapter that decides how models reach the rendering layer, plus the task
//! spawner that runs async operations.
//!
//! [`PushChannel`] is a message-passing push implementation. Mutations are
//! queued onto an unbounded channel and executed in order by the [`PushLoop`]
//! that owns the rendering session, which serializes every commit to every
//! binder of that session. After executing mutations the loop bumps a refresh
//! generation that the rendering host watches.
//!
//! # Example
//!
//! ```ignore
//! let (session, mut push_loop) = Session::push(PushMode::Automatic);
//! let root = bind_root(&session, Model::default(), view, update);
//!
//! let mut refreshes = push_loop.refreshes();
//! loop {
//!     tokio::select! {
//!         Some(_) = push_loop.tick() => terminal.draw(|f| root.render(f))?,
//!         // ... input handling
//!     }
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::delivery::{Delivery, Mutation, NoPush};
use crate::error::ConfigError;
use crate::tasks::Tasks;

/// How a push channel refreshes its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushMode {
    /// No push: the session only sees models on its own render cycle.
    #[default]
    Disabled,
    /// Refresh once per drained batch of mutations.
    Manual,
    /// Refresh after every mutation.
    Automatic,
}

impl PushMode {
    pub fn is_enabled(self) -> bool {
        !matches!(self, PushMode::Disabled)
    }

    pub fn name(self) -> &'static str {
        match self {
            PushMode::Disabled => "disabled",
            PushMode::Manual => "manual",
            PushMode::Automatic => "automatic",
        }
    }
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PushMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(PushMode::Disabled),
            "manual" => Ok(PushMode::Manual),
            "automatic" | "auto" | "on" => Ok(PushMode::Automatic),
            other => Err(ConfigError::UnknownPushMode(other.to_string())),
        }
    }
}

/// Sending half of a push channel; the delivery adapter handed to `bind`.
#[derive(Debug, Clone)]
pub struct PushChannel {
    tx: mpsc::UnboundedSender<Mutation>,
    mode: PushMode,
}

impl PushChannel {
    /// Create a push channel and the loop that executes its mutations.
    pub fn new(mode: PushMode) -> (Self, PushLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (refresh_tx, _) = watch::channel(0);
        (
            Self { tx, mode },
            PushLoop {
                rx,
                mode,
                refresh_tx,
                generation: 0,
            },
        )
    }

    pub fn mode(&self) -> PushMode {
        self.mode
    }
}

impl Delivery for PushChannel {
    fn is_push_active(&self) -> bool {
        self.mode.is_enabled() && !self.tx.is_closed()
    }

    fn run_on_session(&self, mutation: Mutation) {
        if self.tx.send(mutation).is_err() {
            warn!("Rendering session closed, dropping model mutation");
        }
    }
}

/// Receiving half of a push channel, owned by the rendering session.
///
/// Every mutation runs on whichever task drives this loop, one at a time.
pub struct PushLoop {
    rx: mpsc::UnboundedReceiver<Mutation>,
    mode: PushMode,
    refresh_tx: watch::Sender<u64>,
    generation: u64,
}

impl fmt::Debug for PushLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushLoop")
            .field("mode", &self.mode)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl PushLoop {
    /// Run every queued mutation without waiting.
    ///
    /// Mutations queued while draining are run as part of the same batch.
    /// Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(mutation) = self.rx.try_recv() {
            self.execute(mutation);
            ran += 1;
        }
        if ran > 0 && self.mode == PushMode::Manual {
            self.refresh();
        }
        ran
    }

    /// Wait for at least one mutation, then drain the queue.
    ///
    /// Returns the number of mutations run, or `None` once every
    /// [`PushChannel`] has been dropped.
    pub async fn tick(&mut self) -> Option<usize> {
        let first = self.rx.recv().await?;
        self.execute(first);
        let rest = self.drain();
        if rest == 0 && self.mode == PushMode::Manual {
            self.refresh();
        }
        Some(rest + 1)
    }

    /// Drive the loop until the channel closes or `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Push loop cancelled");
                    break;
                }
                ran = self.tick() => {
                    if ran.is_none() {
                        debug!("Push channel closed, stopping loop");
                        break;
                    }
                }
            }
        }
    }

    /// Watch the refresh generation; it increases after every refresh.
    pub fn refreshes(&self) -> watch::Receiver<u64> {
        self.refresh_tx.subscribe()
    }

    /// Number of refreshes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> PushMode {
        self.mode
    }

    fn execute(&mut self, mutation: Mutation) {
        mutation();
        if self.mode == PushMode::Automatic {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.generation += 1;
        trace!(generation = self.generation, "Refreshing session");
        self.refresh_tx.send_replace(self.generation);
    }
}

/// The explicit session context handed to `bind`.
#[derive(Clone)]
pub struct Session {
    delivery: Arc<dyn Delivery>,
    tasks: Tasks,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("push_active", &self.is_push_active())
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl Session {
    /// A session with the given delivery adapter, spawning onto the current runtime.
    pub fn new(delivery: impl Delivery + 'static) -> Self {
        Self {
            delivery: Arc::new(delivery),
            tasks: Tasks::current(),
        }
    }

    /// A session without push: models are committed inline.
    pub fn direct() -> Self {
        Self::new(NoPush)
    }

    /// A session backed by a new push channel.
    pub fn push(mode: PushMode) -> (Self, PushLoop) {
        let (channel, push_loop) = PushChannel::new(mode);
        (Self::new(channel), push_loop)
    }

    /// A push session configured from `config`.
    pub fn from_config(config: &SessionConfig) -> (Self, PushLoop) {
        Self::push(config.push)
    }

    /// Replace the task spawner.
    pub fn with_tasks(mut self, tasks: Tasks) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn delivery(&self) -> &dyn Delivery {
        self.delivery.as_ref()
    }

    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    pub fn is_push_active(&self) -> bool {
        self.delivery.is_push_active()
    }

    /// Drop every pending async operation of this session.
    pub fn shutdown(&self) {
        self.tasks.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting(counter: &Arc<AtomicUsize>) -> Mutation {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_push_mode_parsing() {
        assert_eq!("automatic".parse::<PushMode>().unwrap(), PushMode::Automatic);
        assert_eq!(" Manual ".parse::<PushMode>().unwrap(), PushMode::Manual);
        assert_eq!("off".parse::<PushMode>().unwrap(), PushMode::Disabled);
        assert!(matches!(
            "sometimes".parse::<PushMode>(),
            Err(ConfigError::UnknownPushMode(_))
        ));
        assert_eq!(PushMode::Manual.to_string(), "manual");
    }

    #[test]
    fn test_disabled_channel_is_inactive() {
        let (channel, _loop) = PushChannel::new(PushMode::Disabled);
        assert!(!channel.is_push_active());
    }

    #[test]
    fn test_closed_channel_is_inactive() {
        let (channel, push_loop) = PushChannel::new(PushMode::Automatic);
        assert!(channel.is_push_active());
        drop(push_loop);
        assert!(!channel.is_push_active());
        // Sending to a closed session is logged, not a panic.
        channel.run_on_session(Box::new(|| {}));
    }

    #[test]
    fn test_mutations_wait_for_the_loop() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Automatic);
        let counter = Arc::new(AtomicUsize::new(0));

        channel.run_on_session(counting(&counter));
        channel.run_on_session(counting(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(push_loop.drain(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(push_loop.drain(), 0);
    }

    #[test]
    fn test_automatic_refreshes_per_mutation() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Automatic);
        let counter = Arc::new(AtomicUsize::new(0));
        let refreshes = push_loop.refreshes();

        for _ in 0..3 {
            channel.run_on_session(counting(&counter));
        }
        push_loop.drain();
        assert_eq!(push_loop.generation(), 3);
        assert_eq!(*refreshes.borrow(), 3);
    }

    #[test]
    fn test_manual_refreshes_per_batch() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Manual);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            channel.run_on_session(counting(&counter));
        }
        push_loop.drain();
        assert_eq!(push_loop.generation(), 1);

        push_loop.drain();
        assert_eq!(push_loop.generation(), 1);
    }

    #[test]
    fn test_nested_mutations_join_the_batch() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Manual);
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_channel = channel.clone();
        let inner_counter = counter.clone();
        channel.run_on_session(Box::new(move || {
            inner_channel.run_on_session(counting(&inner_counter));
        }));

        assert_eq!(push_loop.drain(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(push_loop.generation(), 1);
    }

    #[tokio::test]
    async fn test_tick_waits_for_mutation() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Manual);
        let counter = Arc::new(AtomicUsize::new(0));

        let sender = channel.clone();
        let c = counter.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            sender.run_on_session(counting(&c));
        });

        let ran = tokio::time::timeout(Duration::from_millis(200), push_loop.tick())
            .await
            .expect("timeout");
        assert_eq!(ran, Some(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(push_loop.generation(), 1);
    }

    #[tokio::test]
    async fn test_tick_returns_none_when_closed() {
        let (channel, mut push_loop) = PushChannel::new(PushMode::Automatic);
        drop(channel);
        assert_eq!(push_loop.tick().await, None);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (_channel, mut push_loop) = PushChannel::new(PushMode::Automatic);
        let cancel = CancellationToken::new();
        cancel.cancel();
        tokio::time::timeout(Duration::from_millis(100), push_loop.run(cancel))
            .await
            .expect("loop did not stop");
    }

    #[test]
    fn test_direct_session() {
        let session = Session::direct();
        assert!(!session.is_push_active());
    }

    #[test]
    fn test_from_config() {
        let config = SessionConfig {
            push: PushMode::Manual,
        };
        let (session, push_loop) = Session::from_config(&config);
        assert!(session.is_push_active());
        assert_eq!(push_loop.mode(), PushMode::Manual);
    }
}
