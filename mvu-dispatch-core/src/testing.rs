//! Test utilities for components bound with mvu-dispatch
//!
//! - [`TestHarness`]: a recording root dispatcher to bind components under
//! - Assertion macros for verifying which actions reached the root
//!
//! # Example
//!
//! ```ignore
//! use mvu_dispatch::testing::TestHarness;
//! use mvu_dispatch::{assert_emitted, bind, Session};
//!
//! let mut harness = TestHarness::<CounterAction>::new();
//! let dispatcher = bind(&harness.dispatcher(), &Session::direct(), Counter::default(), |_, d| d.clone(), update);
//!
//! dispatcher.dispatch(CounterAction::BroadcastInc)?;
//!
//! let emitted = harness.drain_emitted();
//! assert_emitted!(emitted, CounterAction::BroadcastInc);
//! ```

use tokio::sync::mpsc;

use crate::action::Action;
use crate::dispatcher::Dispatcher;

/// Records every action that reaches the root of a dispatcher chain.
///
/// Components bound under [`dispatcher`](Self::dispatcher) forward their
/// broadcast actions to the harness, which queues them for inspection.
pub struct TestHarness<A: Action> {
    root: Dispatcher<A>,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<A: Action> TestHarness<A> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink_tx = tx.clone();
        let root = Dispatcher::from_fn(move |action: &A| {
            let _ = sink_tx.send(action.clone());
        });
        Self { root, tx, rx }
    }

    /// The recording root chain, to bind components under.
    pub fn dispatcher(&self) -> Dispatcher<A> {
        self.root.clone()
    }

    /// Get a clone of the action sender.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Record an action as if it had reached the root.
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain all recorded actions.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Check if any actions were recorded.
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }
}

impl<A: Action> Default for TestHarness<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, Action::Increment);
/// assert_emitted!(actions, Action::SetValue(42));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// if let Some(Action::PlusX(n)) = find_emitted!(actions, Action::PlusX(_)) {
///     assert_eq!(*n, 5);
/// }
/// ```
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Foo,
        Bar(i32),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Foo => "Foo",
                TestAction::Bar(_) => "Bar",
            }
        }
    }

    #[test]
    fn test_harness_records_root_notifications() {
        let mut harness = TestHarness::<TestAction>::new();
        let root = harness.dispatcher();

        root.dispatch(TestAction::Foo).unwrap();
        for sink in root.all() {
            sink.notify(&TestAction::Bar(42));
        }

        let actions = harness.drain_emitted();
        assert_eq!(actions, vec![TestAction::Foo, TestAction::Bar(42)]);
        assert!(!harness.has_emitted());
    }

    #[test]
    fn test_harness_emit() {
        let mut harness = TestHarness::<TestAction>::default();
        harness.emit(TestAction::Foo);
        assert!(harness.has_emitted());
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![TestAction::Foo, TestAction::Bar(42)];

        assert_emitted!(actions, TestAction::Foo);
        assert_emitted!(actions, TestAction::Bar(42));
        assert_emitted!(actions, TestAction::Bar(n) if *n > 40);

        assert_not_emitted!(actions, TestAction::Bar(99));

        let found = find_emitted!(actions, TestAction::Bar(_));
        assert_eq!(found, Some(&TestAction::Bar(42)));

        assert_eq!(count_emitted!(actions, TestAction::Bar(_)), 1);
    }
}
