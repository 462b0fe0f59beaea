//! Dispatcher chains: a component's own sink followed by every ancestor's

use std::fmt;
use std::sync::Arc;

use crate::action::{Action, AsyncAction, Msg};
use crate::error::BindError;

/// A receiver of actions in a dispatcher chain.
///
/// `notify` receives broadcast actions forwarded from a descendant; the
/// descendant has already applied the action to its own model. `dispatch` is
/// the entry point a widget uses to emit a message.
pub trait Sink<A: Action>: Send + Sync {
    /// Receive a broadcast action forwarded by a descendant.
    fn notify(&self, action: &A);

    /// Handle a message emitted at this sink.
    ///
    /// Sinks without a model accept synchronous actions as notifications and
    /// reject async actions, since there is nothing to apply the start and
    /// follow-up actions to.
    fn dispatch(&self, msg: Msg<A>) -> Result<(), BindError> {
        match msg {
            Msg::Sync(action) => {
                self.notify(&action);
                Ok(())
            }
            Msg::Async(async_action) => Err(BindError::Unbound {
                action: async_action.action().name(),
            }),
        }
    }
}

/// Adapts a closure into a [`Sink`].
pub struct FnSink<F>(F);

impl<F> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<A, F> Sink<A> for FnSink<F>
where
    A: Action,
    F: Fn(&A) + Send + Sync,
{
    fn notify(&self, action: &A) {
        (self.0)(action)
    }
}

struct NoopSink;

impl<A: Action> Sink<A> for NoopSink {
    fn notify(&self, _action: &A) {}
}

struct Node<A: Action> {
    sink: Arc<dyn Sink<A>>,
    parent: Option<Dispatcher<A>>,
    depth: usize,
}

/// An immutable chain of sinks: the component's own sink first, then its
/// parent's full chain.
///
/// Extending a chain never copies it. The new head points at the parent chain,
/// so siblings share their common ancestry and cloning a `Dispatcher` is a
/// reference-count bump.
///
/// # Example
///
/// ```ignore
/// let root = Dispatcher::from_fn(|action: &AppAction| println!("root saw {action:?}"));
/// let child = root.extend(FnSink::new(|_: &AppAction| {}));
/// assert_eq!(child.len(), 2);
/// ```
pub struct Dispatcher<A: Action> {
    node: Arc<Node<A>>,
}

impl<A: Action> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<A: Action> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("len", &self.len())
            .finish()
    }
}

impl<A: Action> Dispatcher<A> {
    /// A chain of length one containing only `sink`.
    pub fn root(sink: impl Sink<A> + 'static) -> Self {
        Self::root_arc(Arc::new(sink))
    }

    /// Like [`root`](Self::root) for an already shared sink.
    pub fn root_arc(sink: Arc<dyn Sink<A>>) -> Self {
        Self {
            node: Arc::new(Node {
                sink,
                parent: None,
                depth: 0,
            }),
        }
    }

    /// A root chain whose sink is a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::root(FnSink::new(f))
    }

    /// A root chain that ignores everything it is sent.
    pub fn empty() -> Self {
        Self::root(NoopSink)
    }

    /// A chain headed by `sink` whose remainder is this chain.
    pub fn extend(&self, sink: impl Sink<A> + 'static) -> Self {
        self.extend_arc(Arc::new(sink))
    }

    /// Like [`extend`](Self::extend) for an already shared sink.
    pub fn extend_arc(&self, sink: Arc<dyn Sink<A>>) -> Self {
        debug_assert!(
            !self.contains(&sink),
            "sink is already part of the parent chain"
        );
        let depth = self.node.depth + 1;
        Self {
            node: Arc::new(Node {
                sink,
                parent: Some(self.clone()),
                depth,
            }),
        }
    }

    /// Every sink in the chain, own sink first.
    pub fn all(&self) -> Iter<'_, A> {
        Iter {
            next: Some(&self.node),
        }
    }

    /// Every sink after the head.
    pub fn ancestors(&self) -> Iter<'_, A> {
        Iter {
            next: self.node.parent.as_ref().map(|parent| &parent.node),
        }
    }

    /// The chain this one was extended from, if any.
    pub fn parent(&self) -> Option<&Dispatcher<A>> {
        self.node.parent.as_ref()
    }

    /// The head of the chain.
    pub fn head(&self) -> &dyn Sink<A> {
        self.node.sink.as_ref()
    }

    /// Number of sinks in the chain.
    pub fn len(&self) -> usize {
        self.node.depth + 1
    }

    /// A chain always holds at least its own sink.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Emit a synchronous action at the head of the chain.
    pub fn dispatch(&self, action: A) -> Result<(), BindError> {
        self.send(Msg::Sync(action))
    }

    /// Emit an async action at the head of the chain.
    pub fn dispatch_async(&self, action: AsyncAction<A>) -> Result<(), BindError> {
        self.send(Msg::Async(action))
    }

    /// Emit any message at the head of the chain.
    pub fn send(&self, msg: Msg<A>) -> Result<(), BindError> {
        self.node.sink.dispatch(msg)
    }

    fn contains(&self, sink: &Arc<dyn Sink<A>>) -> bool {
        let needle = Arc::as_ptr(sink) as *const ();
        let mut next = Some(&self.node);
        while let Some(node) = next {
            if Arc::as_ptr(&node.sink) as *const () == needle {
                return true;
            }
            next = node.parent.as_ref().map(|parent| &parent.node);
        }
        false
    }
}

/// Iterator over the sinks of a [`Dispatcher`].
pub struct Iter<'a, A: Action> {
    next: Option<&'a Arc<Node<A>>>,
}

impl<'a, A: Action> Iterator for Iter<'a, A> {
    type Item = &'a dyn Sink<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.parent.as_ref().map(|parent| &parent.node);
        Some(node.sink.as_ref())
    }
}
