//! UI panels, one per bound component

mod load_bar;
mod step;
mod ticker;

pub use load_bar::{load_action, LoadBar, LoadModel, LoadPanel, HEROES};
pub use step::{Direction, StepEditor, StepModel, StepPanel};
pub use ticker::{Ticker, TickerModel, TickerPanel};

use crossterm::event::KeyEvent;
use mvu_dispatch::BindError;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// A rendered component: draws its binder's current model and turns keys
/// into dispatched actions.
pub trait Panel {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool);

    /// Returns `Ok(true)` if the key was consumed.
    fn handle_key(&self, key: KeyEvent) -> Result<bool, BindError>;
}

pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}
