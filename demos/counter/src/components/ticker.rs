use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use mvu_dispatch::{BindError, Binder, Component, Dispatcher};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use super::{panel_block, Panel};
use crate::action::AppAction;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerModel {
    pub total: i32,
}

/// The root component: a running total that the step editors push into.
pub struct Ticker;

impl Component for Ticker {
    type Model = TickerModel;
    type Action = AppAction;
    type Output = TickerPanel;

    fn init(&self) -> TickerModel {
        TickerModel::default()
    }

    fn view(self, binder: &Binder<TickerModel>, dispatcher: &Dispatcher<AppAction>) -> TickerPanel {
        TickerPanel {
            binder: binder.clone(),
            dispatcher: dispatcher.clone(),
        }
    }

    fn update(action: &AppAction, model: &TickerModel) -> TickerModel {
        match action {
            AppAction::Inc => TickerModel {
                total: model.total + 1,
            },
            AppAction::Dec => TickerModel {
                total: model.total - 1,
            },
            AppAction::Reset => TickerModel::default(),
            AppAction::PlusX(n) => TickerModel {
                total: model.total + n,
            },
            AppAction::MinusX(n) => TickerModel {
                total: model.total - n,
            },
            _ => model.clone(),
        }
    }
}

pub struct TickerPanel {
    binder: Binder<TickerModel>,
    dispatcher: Dispatcher<AppAction>,
}

impl TickerPanel {
    /// Chain to bind child components under.
    pub fn dispatcher(&self) -> &Dispatcher<AppAction> {
        &self.dispatcher
    }

    pub fn model(&self) -> Arc<TickerModel> {
        self.binder.get()
    }
}

impl Panel for TickerPanel {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let total = self.binder.read(|model| model.total);
        let color = if total < 0 { Color::Red } else { Color::Green };
        let paragraph = Paragraph::new(total.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(panel_block("Ticker", focused));
        frame.render_widget(paragraph, area);
    }

    fn handle_key(&self, key: KeyEvent) -> Result<bool, BindError> {
        let action = match key.code {
            KeyCode::Char('k') | KeyCode::Up => AppAction::Inc,
            KeyCode::Char('j') | KeyCode::Down => AppAction::Dec,
            KeyCode::Char('r') => AppAction::Reset,
            _ => return Ok(false),
        };
        self.dispatcher.dispatch(action)?;
        Ok(true)
    }
}
