use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use mvu_dispatch::{AsyncAction, AsyncResult, BindError, Binder, Component, Dispatcher};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::{panel_block, Panel};
use crate::action::AppAction;

pub const HEROES: &[&str] = &["Ada Lovelace", "Grace Hopper", "Alan Turing", "Edsger Dijkstra"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadModel {
    pub loading: bool,
    pub heroes: Vec<String>,
    pub error: Option<String>,
}

/// Loads a list of names in the background.
pub struct LoadBar {
    pub fail: bool,
    pub delay: Duration,
}

/// The async load: shows the spinner first, then either the names or an error.
pub fn load_action(fail: bool, delay: Duration) -> AsyncAction<AppAction> {
    AsyncAction::new(AppAction::Load, AppAction::SetLoading(true), async move {
        tokio::time::sleep(delay).await;
        if fail {
            AsyncResult::from_left(AppAction::DidFail("connection refused".to_string()))
        } else {
            AsyncResult::from_right(AppAction::DidLoad(
                HEROES.iter().map(|name| name.to_string()).collect(),
            ))
        }
    })
}

impl Component for LoadBar {
    type Model = LoadModel;
    type Action = AppAction;
    type Output = LoadPanel;

    fn init(&self) -> LoadModel {
        LoadModel::default()
    }

    fn view(self, binder: &Binder<LoadModel>, dispatcher: &Dispatcher<AppAction>) -> LoadPanel {
        LoadPanel {
            fail: self.fail,
            delay: self.delay,
            binder: binder.clone(),
            dispatcher: dispatcher.clone(),
        }
    }

    fn update(action: &AppAction, model: &LoadModel) -> LoadModel {
        match action {
            AppAction::SetLoading(loading) => LoadModel {
                loading: *loading,
                ..model.clone()
            },
            AppAction::Load => LoadModel {
                heroes: Vec::new(),
                error: None,
                ..model.clone()
            },
            AppAction::DidLoad(heroes) => LoadModel {
                loading: false,
                heroes: heroes.clone(),
                error: None,
            },
            AppAction::DidFail(error) => LoadModel {
                loading: false,
                heroes: Vec::new(),
                error: Some(error.clone()),
            },
            _ => model.clone(),
        }
    }
}

pub struct LoadPanel {
    fail: bool,
    delay: Duration,
    binder: Binder<LoadModel>,
    dispatcher: Dispatcher<AppAction>,
}

impl LoadPanel {
    pub fn model(&self) -> std::sync::Arc<LoadModel> {
        self.binder.get()
    }
}

impl Panel for LoadPanel {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let model = self.binder.get();
        let block = panel_block("Heroes", focused);

        if model.loading {
            let paragraph = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(paragraph, area);
        } else if let Some(error) = &model.error {
            let paragraph = Paragraph::new(Line::from(format!("Load failed: {error}")))
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(paragraph, area);
        } else if model.heroes.is_empty() {
            let paragraph = Paragraph::new("Press l to load")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(paragraph, area);
        } else {
            let items: Vec<ListItem> = model
                .heroes
                .iter()
                .map(|name| ListItem::new(name.as_str()))
                .collect();
            frame.render_widget(List::new(items).block(block), area);
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Result<bool, BindError> {
        match key.code {
            KeyCode::Char('l') | KeyCode::Enter => {
                if self.binder.read(|model| model.loading) {
                    return Ok(true);
                }
                self.dispatcher
                    .dispatch_async(load_action(self.fail, self.delay))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
