//! The bind engine: wiring a model, a view and an update function into a tree
//!
//! [`bind`] creates a [`Binder`] for the model, registers a local sink at the
//! head of a new [`Dispatcher`] chain (own sink first, then the parent's full
//! chain), and calls the view with both. Every message dispatched at that head
//! goes through the same algorithm:
//!
//! - a synchronous action is applied once: the update function folds it into
//!   the current model, a broadcast action is then delivered to every ancestor
//!   sink, and the new model is committed;
//! - an async action first applies its start action, then starts `perform`
//!   without blocking, then applies the action itself; whichever follow-up
//!   `perform` resolves to is applied later.
//!
//! Under push delivery every application runs on the session loop, so
//! applications for one binder never interleave, including follow-ups that
//! resolve on a worker thread.
//!
//! Ancestors apply a forwarded broadcast to their own model but do not forward
//! it again: the originating component already delivered it to the whole chain,
//! so every sink sees each broadcast exactly once.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::action::{Action, AsyncAction, Msg};
use crate::binder::Binder;
use crate::dispatcher::{Dispatcher, Sink};
use crate::error::BindError;
use crate::session::Session;

type Update<A, M> = Box<dyn Fn(&A, &M) -> M + Send + Sync>;

/// Bind `model` under `parent` and render it with `view`.
///
/// `view` receives the component's binder and its new dispatcher chain, and
/// its output is returned unchanged. `update` must be pure: it receives the
/// action and the current model and returns the next model, leaving models it
/// does not recognize untouched.
///
/// # Example
///
/// ```ignore
/// let child = bind(
///     &parent,
///     &session,
///     Counter { value: 0 },
///     |binder, dispatcher| CounterView::new(binder.clone(), dispatcher.clone()),
///     |action, model| match action {
///         CounterAction::Inc => Counter { value: model.value + 1 },
///         _ => model.clone(),
///     },
/// );
/// ```
pub fn bind<A, M, R, V, U>(
    parent: &Dispatcher<A>,
    session: &Session,
    model: M,
    view: V,
    update: U,
) -> R
where
    A: Action,
    M: Send + Sync + 'static,
    V: FnOnce(&Binder<M>, &Dispatcher<A>) -> R,
    U: Fn(&A, &M) -> M + Send + Sync + 'static,
{
    let (binder, sink) = BoundSink::new(Some(parent.clone()), session, model, update);
    let dispatcher = parent.extend_arc(sink);
    trace!(depth = dispatcher.len(), "Bound component");
    view(&binder, &dispatcher)
}

/// Bind a root component, one without ancestors.
///
/// Its dispatcher chain holds only its own sink, so broadcast actions are
/// applied locally and go nowhere else.
pub fn bind_root<A, M, R, V, U>(session: &Session, model: M, view: V, update: U) -> R
where
    A: Action,
    M: Send + Sync + 'static,
    V: FnOnce(&Binder<M>, &Dispatcher<A>) -> R,
    U: Fn(&A, &M) -> M + Send + Sync + 'static,
{
    let (binder, sink) = BoundSink::new(None, session, model, update);
    let dispatcher = Dispatcher::root_arc(sink);
    trace!("Bound root component");
    view(&binder, &dispatcher)
}

/// A component packaged as a model, a view and an update function.
///
/// # Example
///
/// ```ignore
/// struct Ticker;
///
/// impl Component for Ticker {
///     type Model = TickerModel;
///     type Action = AppAction;
///     type Output = TickerPanel;
///
///     fn init(&self) -> TickerModel {
///         TickerModel::default()
///     }
///
///     fn view(self, binder: &Binder<TickerModel>, dispatcher: &Dispatcher<AppAction>) -> TickerPanel {
///         TickerPanel::new(binder.clone(), dispatcher.clone())
///     }
///
///     fn update(action: &AppAction, model: &TickerModel) -> TickerModel {
///         match action {
///             AppAction::PlusX(n) => TickerModel { total: model.total + n },
///             _ => model.clone(),
///         }
///     }
/// }
///
/// let panel = Ticker.mount(&parent, &session);
/// ```
pub trait Component: Sized + 'static {
    type Model: Send + Sync + 'static;
    type Action: Action;
    type Output;

    /// The initial model.
    fn init(&self) -> Self::Model;

    /// Render the component once bound.
    fn view(self, binder: &Binder<Self::Model>, dispatcher: &Dispatcher<Self::Action>)
        -> Self::Output;

    /// Fold an action into the next model.
    fn update(action: &Self::Action, model: &Self::Model) -> Self::Model;

    /// Bind this component under `parent`.
    fn mount(self, parent: &Dispatcher<Self::Action>, session: &Session) -> Self::Output {
        let model = self.init();
        bind(
            parent,
            session,
            model,
            move |binder, dispatcher| self.view(binder, dispatcher),
            Self::update,
        )
    }

    /// Bind this component as the root of a tree.
    fn mount_root(self, session: &Session) -> Self::Output {
        let model = self.init();
        bind_root(
            session,
            model,
            move |binder, dispatcher| self.view(binder, dispatcher),
            Self::update,
        )
    }
}

struct Engine<A: Action, M> {
    binder: Binder<M>,
    update: Update<A, M>,
    /// Ancestors that receive broadcast actions. `None` for a root.
    parent: Option<Dispatcher<A>>,
    session: Session,
}

impl<A: Action, M: Send + Sync + 'static> Engine<A, M> {
    /// Apply one action: read, update, fan out, commit.
    fn apply_one(&self, action: &A, fan_out: bool) {
        let old = self.binder.get();
        let new = (self.update)(action, &old);

        if fan_out && action.is_broadcast() {
            if let Some(parent) = &self.parent {
                for sink in parent.all() {
                    trace!(action = action.name(), "Delivering broadcast to ancestor");
                    sink.notify(action);
                }
            }
        }

        self.binder.replace(new);
        trace!(action = action.name(), "Applied action");
    }

    /// Apply on the session loop when push is active, inline otherwise.
    fn schedule(this: &Arc<Self>, action: A, fan_out: bool) {
        if this.session.is_push_active() {
            let engine = Arc::clone(this);
            this.session
                .delivery()
                .run_on_session(Box::new(move || engine.apply_one(&action, fan_out)));
        } else {
            this.apply_one(&action, fan_out);
        }
    }

    fn dispatch_async(this: &Arc<Self>, async_action: AsyncAction<A>) -> Result<(), BindError> {
        let name = async_action.action().name();
        if !this.session.is_push_active() {
            return Err(BindError::PushInactive { action: name });
        }
        if !this.session.tasks().is_available() {
            return Err(BindError::NoRuntime { action: name });
        }

        let (action, start, perform) = async_action.into_parts();
        let engine = Arc::clone(this);
        this.session.delivery().run_on_session(Box::new(move || {
            engine.apply_one(&start, true);

            let continuation = Arc::clone(&engine);
            let spawned = engine.session.tasks().spawn(name, async move {
                let result = perform.await;
                debug!(action = name, left = result.is_left(), "Async operation resolved");
                let follow_up = result.into_inner();
                let target = Arc::clone(&continuation);
                // The follow-up always goes through the session loop, even if
                // push was switched off while `perform` was running.
                continuation
                    .session
                    .delivery()
                    .run_on_session(Box::new(move || target.apply_one(&follow_up, true)));
            });
            if spawned.is_none() {
                warn!(action = name, "Runtime went away, follow-up will not be applied");
            }

            engine.apply_one(&action, true);
        }));
        Ok(())
    }
}

/// The local sink `bind` places at the head of a component's chain.
struct BoundSink<A: Action, M> {
    engine: Arc<Engine<A, M>>,
}

impl<A: Action, M: Send + Sync + 'static> BoundSink<A, M> {
    fn new<U>(
        parent: Option<Dispatcher<A>>,
        session: &Session,
        model: M,
        update: U,
    ) -> (Binder<M>, Arc<dyn Sink<A>>)
    where
        U: Fn(&A, &M) -> M + Send + Sync + 'static,
    {
        let binder = Binder::new(model);
        let engine = Arc::new(Engine {
            binder: binder.clone(),
            update: Box::new(update),
            parent,
            session: session.clone(),
        });
        (binder, Arc::new(Self { engine }))
    }
}

impl<A: Action, M> fmt::Debug for BoundSink<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSink")
            .field("has_parent", &self.engine.parent.is_some())
            .field("session", &self.engine.session)
            .finish()
    }
}

impl<A: Action, M: Send + Sync + 'static> Sink<A> for BoundSink<A, M> {
    fn notify(&self, action: &A) {
        // Already delivered to the whole chain by the originating component.
        Engine::schedule(&self.engine, action.clone(), false);
    }

    fn dispatch(&self, msg: Msg<A>) -> Result<(), BindError> {
        debug!(action = msg.name(), flags = ?msg.flags(), "Dispatching action");
        match msg {
            Msg::Sync(action) => {
                Engine::schedule(&self.engine, action, true);
                Ok(())
            }
            Msg::Async(async_action) => Engine::dispatch_async(&self.engine, async_action),
        }
    }
}
