//! Counter demo for mvu-dispatch
//!
//! A ticker bound at the root, two step editors whose `PlusX`/`MinusX`
//! broadcasts reach the ticker, and a load bar driven by an async action.

pub mod action;
pub mod app;
pub mod components;
pub mod input;

pub use action::AppAction;
pub use app::{App, Focus, Options, Outcome};
