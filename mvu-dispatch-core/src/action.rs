//! Action taxonomy: plain, broadcast and asynchronous actions

use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;

use bitflags::bitflags;

use crate::error::BindError;

/// Trait for values that update functions fold into a new model
///
/// Actions represent intents to change state. They should be:
/// - Clone: broadcast actions are delivered to every ancestor
/// - Debug: for tracing
/// - Send + Sync + 'static: async follow-ups are applied from other threads
///
/// Use `#[derive(Action)]` from `mvu-dispatch-macros` to implement this trait.
/// Mark variants with `#[action(broadcast)]` to have them replicated to ancestors.
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// Get the action name for logging
    fn name(&self) -> &'static str;

    /// Whether this action is replicated to every ancestor after the local update
    fn is_broadcast(&self) -> bool {
        false
    }
}

bitflags! {
    /// Capability flags of a dispatched message.
    ///
    /// The two flags are independent: an async action may also be broadcast.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionFlags: u8 {
        /// Replicated to the ancestor chain after the local update.
        const BROADCAST = 1 << 0;
        /// Sequenced via start action, perform and follow-up.
        const ASYNC = 1 << 1;
    }
}

impl ActionFlags {
    /// Flags for a synchronous action.
    pub fn of<A: Action>(action: &A) -> Self {
        if action.is_broadcast() {
            ActionFlags::BROADCAST
        } else {
            ActionFlags::empty()
        }
    }
}

/// The future an async action performs.
pub type Perform<A> = Pin<Box<dyn Future<Output = AsyncResult<A, A>> + Send + 'static>>;

/// An action whose effect spans an immediate start phase and a later follow-up.
///
/// Dispatching it applies `start` (typically a "loading" action), starts
/// `perform` without blocking, applies `action` itself, and finally applies the
/// left or right action produced by `perform`.
pub struct AsyncAction<A> {
    action: A,
    start: A,
    perform: Perform<A>,
}

impl<A: Action> AsyncAction<A> {
    /// Create an async action from a future.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let load = AsyncAction::new(Action::Load, Action::SetLoading(true), async move {
    ///     match api::fetch(id).await {
    ///         Ok(data) => AsyncResult::from_right(Action::DidLoad(data)),
    ///         Err(e) => AsyncResult::from_left(Action::DidFail(e.to_string())),
    ///     }
    /// });
    /// dispatcher.dispatch_async(load)?;
    /// ```
    pub fn new<F>(action: A, start: A, perform: F) -> Self
    where
        F: Future<Output = AsyncResult<A, A>> + Send + 'static,
    {
        Self {
            action,
            start,
            perform: Box::pin(perform),
        }
    }

    /// Create an async action from a blocking closure.
    ///
    /// The closure runs on tokio's blocking pool.
    pub fn blocking<F>(action: A, start: A, perform: F) -> Self
    where
        F: FnOnce() -> AsyncResult<A, A> + Send + 'static,
    {
        Self::new(action, start, async move {
            match tokio::task::spawn_blocking(perform).await {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                // Runtime shutdown: the owning task is being torn down as well.
                Err(_) => std::future::pending().await,
            }
        })
    }

    /// The async action value itself.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// The action applied before `perform` starts.
    pub fn start(&self) -> &A {
        &self.start
    }

    /// Async flag plus the broadcast classification of the action itself.
    pub fn flags(&self) -> ActionFlags {
        ActionFlags::of(&self.action) | ActionFlags::ASYNC
    }

    pub(crate) fn into_parts(self) -> (A, A, Perform<A>) {
        (self.action, self.start, self.perform)
    }
}

impl<A: Debug> Debug for AsyncAction<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("action", &self.action)
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}

/// A message handed to a dispatcher.
#[derive(Debug)]
pub enum Msg<A> {
    /// Applied immediately.
    Sync(A),
    /// Sequenced through the three-step async protocol.
    Async(AsyncAction<A>),
}

impl<A: Action> Msg<A> {
    /// Name of the carried action.
    pub fn name(&self) -> &'static str {
        match self {
            Msg::Sync(action) => action.name(),
            Msg::Async(async_action) => async_action.action.name(),
        }
    }

    pub fn flags(&self) -> ActionFlags {
        match self {
            Msg::Sync(action) => ActionFlags::of(action),
            Msg::Async(async_action) => async_action.flags(),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Msg::Async(_))
    }

    pub fn is_broadcast(&self) -> bool {
        self.flags().contains(ActionFlags::BROADCAST)
    }
}

impl<A> From<AsyncAction<A>> for Msg<A> {
    fn from(async_action: AsyncAction<A>) -> Self {
        Msg::Async(async_action)
    }
}

/// Outcome of an async action: exactly one of a failure (left) or success (right).
///
/// Having neither or both sides populated is unrepresentable. Requesting the
/// unpopulated side returns [`BindError::InvalidState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncResult<L, R> {
    /// Typically the "failed" follow-up.
    Left(L),
    /// Typically the "succeeded" follow-up.
    Right(R),
}

impl<L, R> AsyncResult<L, R> {
    pub fn from_left(left: L) -> Self {
        AsyncResult::Left(left)
    }

    pub fn from_right(right: R) -> Self {
        AsyncResult::Right(right)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, AsyncResult::Left(_))
    }

    pub fn is_right(&self) -> bool {
        matches!(self, AsyncResult::Right(_))
    }

    /// Take the left value.
    pub fn left(self) -> Result<L, BindError> {
        match self {
            AsyncResult::Left(left) => Ok(left),
            AsyncResult::Right(_) => Err(BindError::InvalidState(
                "AsyncResult holds a right value; check is_left() before calling left()",
            )),
        }
    }

    /// Take the right value.
    pub fn right(self) -> Result<R, BindError> {
        match self {
            AsyncResult::Right(right) => Ok(right),
            AsyncResult::Left(_) => Err(BindError::InvalidState(
                "AsyncResult holds a left value; check is_right() before calling right()",
            )),
        }
    }

    pub fn as_left(&self) -> Option<&L> {
        match self {
            AsyncResult::Left(left) => Some(left),
            AsyncResult::Right(_) => None,
        }
    }

    pub fn as_right(&self) -> Option<&R> {
        match self {
            AsyncResult::Right(right) => Some(right),
            AsyncResult::Left(_) => None,
        }
    }
}

impl<A> AsyncResult<A, A> {
    /// The follow-up action, whichever side it is on.
    pub fn into_inner(self) -> A {
        match self {
            AsyncResult::Left(action) | AsyncResult::Right(action) => action,
        }
    }
}

impl<L, R> From<Result<R, L>> for AsyncResult<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(right) => AsyncResult::Right(right),
            Err(left) => AsyncResult::Left(left),
        }
    }
}
