//! The component tree and its focus handling

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use mvu_dispatch::{BindError, Component, Session};
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use tracing::warn;

use crate::components::{LoadBar, LoadPanel, Panel, StepEditor, StepPanel, Ticker, TickerPanel};
use crate::input::RawEvent;

pub const INITIAL_STEP: i32 = 10;

const HELP: &str = "tab: focus  k/j: up/down  enter: apply  l: load  r: reset  q: quit";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Make the async load resolve to its failure follow-up.
    pub fail: bool,
    pub load_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fail: false,
            load_delay: Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Render,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ticker,
    Plus,
    Minus,
    Loader,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Ticker, Focus::Plus, Focus::Minus, Focus::Loader];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Ticker at the root with two step editors and a load bar bound under it.
pub struct App {
    pub ticker: TickerPanel,
    pub plus: StepPanel,
    pub minus: StepPanel,
    pub loader: LoadPanel,
    focus: Focus,
    status: Option<String>,
}

impl App {
    pub fn mount(session: &Session, options: Options) -> Self {
        let ticker = Ticker.mount_root(session);
        let plus = StepEditor::plus(INITIAL_STEP).mount(ticker.dispatcher(), session);
        let minus = StepEditor::minus(INITIAL_STEP).mount(ticker.dispatcher(), session);
        let loader = LoadBar {
            fail: options.fail,
            delay: options.load_delay,
        }
        .mount(ticker.dispatcher(), session);

        Self {
            ticker,
            plus,
            minus,
            loader,
            focus: Focus::Ticker,
            status: None,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn handle_event(&mut self, event: RawEvent) -> Outcome {
        match event {
            RawEvent::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            RawEvent::Key(_) => Outcome::Ignored,
            RawEvent::Resize(..) => Outcome::Render,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Outcome::Quit,
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Outcome::Render;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Outcome::Render;
            }
            _ => {}
        }

        match self.focused().handle_key(key) {
            Ok(true) => {
                self.status = None;
                Outcome::Render
            }
            Ok(false) => Outcome::Ignored,
            Err(err) => {
                self.report(err);
                Outcome::Render
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let [ticker_area, steps_area, loader_area, status_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let [plus_area, minus_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(steps_area);

        self.ticker
            .render(frame, ticker_area, self.focus == Focus::Ticker);
        self.plus.render(frame, plus_area, self.focus == Focus::Plus);
        self.minus
            .render(frame, minus_area, self.focus == Focus::Minus);
        self.loader
            .render(frame, loader_area, self.focus == Focus::Loader);

        if let Some(status) = &self.status {
            let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(status, status_area);
        }

        let help = Paragraph::new(HELP)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, help_area);
    }

    fn focused(&self) -> &dyn Panel {
        match self.focus {
            Focus::Ticker => &self.ticker,
            Focus::Plus => &self.plus,
            Focus::Minus => &self.minus,
            Focus::Loader => &self.loader,
        }
    }

    fn report(&mut self, err: BindError) {
        warn!(error = %err, "Dispatch rejected");
        self.status = Some(err.to_string());
    }
}
