//! Actions - what can happen anywhere in the tree

use mvu_dispatch::Action;

#[derive(Action, Clone, Debug, PartialEq)]
pub enum AppAction {
    // Ticker
    Inc,
    Dec,
    Reset,

    // Step editors (plain: only the editor that emitted them sees these)
    StepUp,
    StepDown,

    // Emitted by the step editors and applied by the ticker as well
    #[action(broadcast)]
    PlusX(i32),
    #[action(broadcast)]
    MinusX(i32),

    // Load bar
    Load,
    SetLoading(bool),
    DidLoad(Vec<String>),
    DidFail(String),
}
