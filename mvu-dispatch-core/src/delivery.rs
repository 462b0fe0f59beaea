//! Delivery adapters: how committed models reach the rendering session

/// A model commit marshalled onto the rendering session's context.
pub type Mutation = Box<dyn FnOnce() + Send + 'static>;

/// The rendering host's side of model delivery.
///
/// When push is active, every model mutation is handed to
/// [`run_on_session`](Self::run_on_session), which runs it on the context that
/// owns the rendering session and then refreshes that session. When push is
/// inactive the engine commits directly and relies on the surrounding render
/// cycle to pick the new model up.
pub trait Delivery: Send + Sync {
    /// Whether an out-of-band refresh channel is active for this session.
    fn is_push_active(&self) -> bool;

    /// Run `mutation` on the session context, then refresh the session.
    fn run_on_session(&self, mutation: Mutation);
}

/// Delivery without a push channel.
///
/// Mutations run inline on the caller. Async actions are refused by the
/// engine under this adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPush;

impl Delivery for NoPush {
    fn is_push_active(&self) -> bool {
        false
    }

    fn run_on_session(&self, mutation: Mutation) {
        mutation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_no_push_runs_inline() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        NoPush.run_on_session(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
        assert!(!NoPush.is_push_active());
    }
}
