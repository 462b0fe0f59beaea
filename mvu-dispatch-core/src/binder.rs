//! The binder: holder of one component's current model

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Holds exactly one live model snapshot for one bound component.
///
/// Models are immutable; every applied action replaces the snapshot wholesale.
/// Views receive the binder to read the current model, and rendering layers
/// can [`subscribe`](Self::subscribe) to be woken on every commit. Only the bind
/// engine replaces the model.
pub struct Binder<M> {
    tx: Arc<watch::Sender<Arc<M>>>,
}

impl<M> Clone for Binder<M> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Binder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binder").field(&*self.tx.borrow()).finish()
    }
}

impl<M> Binder<M> {
    /// Create a binder seeded with `model`.
    pub fn new(model: M) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(model));
        Self { tx: Arc::new(tx) }
    }

    /// The current model snapshot.
    pub fn get(&self) -> Arc<M> {
        Arc::clone(&self.tx.borrow())
    }

    /// Read the current model without cloning the snapshot handle.
    ///
    /// Do not dispatch from inside `f`.
    pub fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Watch for committed models.
    pub fn subscribe(&self) -> watch::Receiver<Arc<M>> {
        self.tx.subscribe()
    }

    /// Replace the model, returning the previous snapshot.
    pub(crate) fn replace(&self, model: M) -> Arc<M> {
        self.tx.send_replace(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Model {
        value: i32,
    }

    #[test]
    fn test_get_and_replace() {
        let binder = Binder::new(Model { value: 0 });
        assert_eq!(binder.get().value, 0);

        let old = binder.replace(Model { value: 1 });
        assert_eq!(old.value, 0);
        assert_eq!(binder.get().value, 1);
        assert_eq!(binder.read(|m| m.value), 1);
    }

    #[test]
    fn test_clones_share_the_model() {
        let binder = Binder::new(Model { value: 0 });
        let other = binder.clone();
        binder.replace(Model { value: 5 });
        assert_eq!(other.get().value, 5);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let binder = Binder::new(Model { value: 0 });
        let before = binder.get();
        binder.replace(Model { value: 9 });
        assert_eq!(before.value, 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let binder = Binder::new(Model { value: 0 });
        let mut rx = binder.subscribe();

        binder.replace(Model { value: 3 });
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().value, 3);
    }

    #[test]
    fn test_debug_shows_model() {
        let binder = Binder::new(Model { value: 2 });
        assert_eq!(format!("{binder:?}"), "Binder(Model { value: 2 })");
    }
}
