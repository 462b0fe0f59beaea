//! mvu-dispatch: Model-View-Update binding for component trees
//!
//! Each component owns an immutable model, a pure update function and a view.
//! Actions flow from a component up through its dispatcher chain; broadcast
//! actions are replicated to every ancestor, and async actions are sequenced
//! through a start action, a background operation and a follow-up.
//!
//! # Example
//! ```ignore
//! use mvu_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Inc,
//!     #[action(broadcast)]
//!     PlusX(i32),
//! }
//!
//! let (session, mut push_loop) = Session::push(PushMode::Automatic);
//! let panel = Ticker.mount_root(&session);
//! ```

// Re-export everything from core
pub use mvu_dispatch_core::*;

// Re-export derive macros
pub use mvu_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use mvu_dispatch_core::{Action, Component, Delivery, Sink};

    // Actions
    pub use mvu_dispatch_core::{ActionFlags, AsyncAction, AsyncResult, Msg};

    // Binding
    pub use mvu_dispatch_core::{bind, bind_root, Binder, Dispatcher, FnSink};

    // Sessions
    pub use mvu_dispatch_core::{
        BindError, NoPush, PushChannel, PushLoop, PushMode, Session, SessionConfig, Tasks,
    };

    // Derive macros
    pub use mvu_dispatch_macros::Action;
}
