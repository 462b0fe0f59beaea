//! Core binding and dispatch engine for mvu-dispatch
//!
//! This crate implements unidirectional state management for component trees.
//! Each component owns an immutable model, a pure update function folding
//! actions into a new model, and a view that renders the model and emits
//! actions through a dispatcher.
//!
//! # Core Concepts
//!
//! - **Action**: an intent value; plain, broadcast (replicated to ancestors) or async
//! - **Dispatcher**: the chain of sinks from a component up through its ancestors
//! - **Binder**: the holder of one component's current model
//! - **Bind engine**: [`bind`] wires model, view and update together
//! - **Session**: how committed models reach the rendering layer, with or without push
//!
//! # Basic Example
//!
//! ```ignore
//! use mvu_dispatch_core::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Inc,
//!     BroadcastInc,
//! }
//!
//! impl Action for CounterAction {
//!     fn name(&self) -> &'static str { /* ... */ }
//!     fn is_broadcast(&self) -> bool {
//!         matches!(self, CounterAction::BroadcastInc)
//!     }
//! }
//!
//! let session = Session::direct();
//! let (binder, dispatcher) = bind_root(
//!     &session,
//!     Counter { value: 0 },
//!     |binder, dispatcher| (binder.clone(), dispatcher.clone()),
//!     |action, model| match action {
//!         CounterAction::Inc => Counter { value: model.value + 1 },
//!         _ => model.clone(),
//!     },
//! );
//!
//! dispatcher.dispatch(CounterAction::Inc)?;
//! assert_eq!(binder.get().value, 1);
//! ```
//!
//! # Async Actions
//!
//! Async actions need a push session, since their follow-up arrives after the
//! caller has returned and must be marshalled onto the rendering session:
//!
//! ```ignore
//! let (session, mut push_loop) = Session::push(PushMode::Automatic);
//! let (binder, dispatcher) = bind_root(&session, Loader::default(), view, update);
//!
//! dispatcher.dispatch_async(AsyncAction::new(
//!     Action::Load,
//!     Action::SetLoading(true),
//!     async move {
//!         match fetch().await {
//!             Ok(data) => AsyncResult::from_right(Action::Loaded(data)),
//!             Err(e) => AsyncResult::from_left(Action::Failed(e.to_string())),
//!         }
//!     },
//! ))?;
//!
//! loop {
//!     tokio::select! {
//!         Some(_) = push_loop.tick() => terminal.draw(|f| render(f, &binder))?,
//!         // ... event handling
//!     }
//! }
//! ```

pub mod action;
pub mod bind;
pub mod binder;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionFlags, AsyncAction, AsyncResult, Msg, Perform};
pub use bind::{bind, bind_root, Component};
pub use binder::Binder;
pub use dispatcher::{Dispatcher, FnSink, Sink};

// Delivery exports
pub use delivery::{Delivery, Mutation, NoPush};
pub use session::{PushChannel, PushLoop, PushMode, Session};
pub use tasks::Tasks;

pub use config::SessionConfig;
pub use error::{BindError, ConfigError};

// Testing exports
pub use testing::TestHarness;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionFlags, AsyncAction, AsyncResult, Msg};
    pub use crate::bind::{bind, bind_root, Component};
    pub use crate::binder::Binder;
    pub use crate::config::SessionConfig;
    pub use crate::delivery::{Delivery, NoPush};
    pub use crate::dispatcher::{Dispatcher, FnSink, Sink};
    pub use crate::error::BindError;
    pub use crate::session::{PushChannel, PushLoop, PushMode, Session};
    pub use crate::tasks::Tasks;
}
