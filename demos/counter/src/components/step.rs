use crossterm::event::{KeyCode, KeyEvent};
use mvu_dispatch::{BindError, Binder, Component, Dispatcher};
use ratatui::{layout::Alignment, layout::Rect, widgets::Paragraph, Frame};

use super::{panel_block, Panel};
use crate::action::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepModel {
    pub step: i32,
}

/// Holds a step size and broadcasts it to the ticker on Enter.
pub struct StepEditor {
    direction: Direction,
    initial: i32,
}

impl StepEditor {
    pub fn plus(initial: i32) -> Self {
        Self {
            direction: Direction::Plus,
            initial,
        }
    }

    pub fn minus(initial: i32) -> Self {
        Self {
            direction: Direction::Minus,
            initial,
        }
    }
}

impl Component for StepEditor {
    type Model = StepModel;
    type Action = AppAction;
    type Output = StepPanel;

    fn init(&self) -> StepModel {
        StepModel { step: self.initial }
    }

    fn view(self, binder: &Binder<StepModel>, dispatcher: &Dispatcher<AppAction>) -> StepPanel {
        StepPanel {
            direction: self.direction,
            binder: binder.clone(),
            dispatcher: dispatcher.clone(),
        }
    }

    fn update(action: &AppAction, model: &StepModel) -> StepModel {
        match action {
            AppAction::StepUp => StepModel {
                step: model.step + 1,
            },
            AppAction::StepDown => StepModel {
                step: (model.step - 1).max(1),
            },
            _ => model.clone(),
        }
    }
}

pub struct StepPanel {
    direction: Direction,
    binder: Binder<StepModel>,
    dispatcher: Dispatcher<AppAction>,
}

impl StepPanel {
    pub fn step(&self) -> i32 {
        self.binder.read(|model| model.step)
    }

    fn title(&self) -> &'static str {
        match self.direction {
            Direction::Plus => "Plus X",
            Direction::Minus => "Minus X",
        }
    }
}

impl Panel for StepPanel {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let sign = match self.direction {
            Direction::Plus => '+',
            Direction::Minus => '-',
        };
        let paragraph = Paragraph::new(format!("{sign}{}", self.step()))
            .alignment(Alignment::Center)
            .block(panel_block(self.title(), focused));
        frame.render_widget(paragraph, area);
    }

    fn handle_key(&self, key: KeyEvent) -> Result<bool, BindError> {
        let action = match key.code {
            KeyCode::Char('k') | KeyCode::Up => AppAction::StepUp,
            KeyCode::Char('j') | KeyCode::Down => AppAction::StepDown,
            KeyCode::Enter | KeyCode::Char(' ') => match self.direction {
                Direction::Plus => AppAction::PlusX(self.step()),
                Direction::Minus => AppAction::MinusX(self.step()),
            },
            _ => return Ok(false),
        };
        self.dispatcher.dispatch(action)?;
        Ok(true)
    }
}
