//! Render tests using ratatui's TestBackend
//!
//! Mount the app on a session, feed it keys, draw to an in-memory terminal
//! and check the rendered text.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mvu_counter::{App, Focus, Options, Outcome};
use mvu_dispatch::{PushLoop, PushMode, Session};
use ratatui::{backend::TestBackend, Terminal};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();

    let buffer = terminal.backend().buffer();
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            output.push_str(buffer[(x, y)].symbol());
        }
        output.push('\n');
    }
    output
}

fn fast_options(fail: bool) -> Options {
    Options {
        fail,
        load_delay: Duration::from_millis(10),
    }
}

async fn pump_until(push_loop: &mut PushLoop, mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        push_loop.drain();
        while !done() {
            push_loop.tick().await;
        }
    })
    .await
    .expect("timed out waiting for session work");
}

#[test]
fn test_render_initial_state() {
    let app = App::mount(&Session::direct(), Options::default());
    let output = render(&app);

    assert!(output.contains("Ticker"), "Should show ticker");
    assert!(output.contains("+10"), "Should show plus step");
    assert!(output.contains("-10"), "Should show minus step");
    assert!(output.contains("Press l to load"), "Should show load hint");
}

#[test]
fn test_plain_actions_update_ticker() {
    let mut app = App::mount(&Session::direct(), Options::default());

    assert_eq!(app.handle_key(key(KeyCode::Char('k'))), Outcome::Render);
    app.handle_key(key(KeyCode::Char('k')));
    app.handle_key(key(KeyCode::Char('k')));
    app.handle_key(key(KeyCode::Down));

    assert_eq!(app.ticker.model().total, 2);
    assert!(render(&app).contains(" 2 "));
}

#[test]
fn test_step_editors_broadcast_to_ticker() {
    let mut app = App::mount(&Session::direct(), Options::default());

    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.focus(), Focus::Plus);
    app.handle_key(key(KeyCode::Char('k')));
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.plus.step(), 11);
    assert_eq!(app.ticker.model().total, 11);

    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.focus(), Focus::Minus);
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.minus.step(), 10);
    assert_eq!(app.ticker.model().total, -9);
    assert!(render(&app).contains("-9"));
}

#[test]
fn test_step_changes_stay_local() {
    let mut app = App::mount(&Session::direct(), Options::default());

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Char('j')));

    assert_eq!(app.plus.step(), 9);
    assert_eq!(app.minus.step(), 10);
    assert_eq!(app.ticker.model().total, 0);
}

#[test]
fn test_focus_wraps() {
    let mut app = App::mount(&Session::direct(), Options::default());
    app.handle_key(key(KeyCode::BackTab));
    assert_eq!(app.focus(), Focus::Loader);
    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.focus(), Focus::Ticker);
}

#[test]
fn test_quit() {
    let mut app = App::mount(&Session::direct(), Options::default());
    assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Outcome::Quit);
}

#[test]
fn test_load_without_push_reports_error() {
    let mut app = App::mount(&Session::direct(), fast_options(false));

    app.handle_key(key(KeyCode::BackTab));
    assert_eq!(app.handle_key(key(KeyCode::Char('l'))), Outcome::Render);

    let status = app.status().expect("status should be set");
    assert!(status.contains("requires an active push/refresh channel"));
    assert!(!app.loader.model().loading);
    assert!(render(&app).contains("push/refresh channel"));
}

#[tokio::test]
async fn test_load_success_under_push() {
    let (session, mut push_loop) = Session::push(PushMode::Automatic);
    let mut app = App::mount(&session, fast_options(false));

    app.handle_key(key(KeyCode::BackTab));
    app.handle_key(key(KeyCode::Char('l')));
    push_loop.drain();

    assert!(app.loader.model().loading);
    assert!(render(&app).contains("Loading..."));

    pump_until(&mut push_loop, || !app.loader.model().heroes.is_empty()).await;

    let output = render(&app);
    assert!(output.contains("Ada Lovelace"));
    assert!(!output.contains("Loading..."));
    assert_eq!(app.status(), None);
}

#[tokio::test]
async fn test_load_failure_under_push() {
    let (session, mut push_loop) = Session::push(PushMode::Manual);
    let mut app = App::mount(&session, fast_options(true));

    app.handle_key(key(KeyCode::BackTab));
    app.handle_key(key(KeyCode::Enter));

    pump_until(&mut push_loop, || app.loader.model().error.is_some()).await;

    let model = app.loader.model();
    assert!(!model.loading);
    assert!(model.heroes.is_empty());
    assert!(render(&app).contains("Load failed: connection refused"));
}

#[tokio::test]
async fn test_broadcast_under_push_waits_for_loop() {
    let (session, mut push_loop) = Session::push(PushMode::Automatic);
    let mut app = App::mount(&session, Options::default());

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.ticker.model().total, 0);

    push_loop.drain();
    assert_eq!(app.ticker.model().total, 10);
    assert_eq!(push_loop.generation(), 2);
}
