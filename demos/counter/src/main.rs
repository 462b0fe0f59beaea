//! Counter - mvu-dispatch demo
//!
//! A component tree bound with mvu-dispatch:
//! - Ticker: root component with plain Inc/Dec/Reset actions
//! - Plus X / Minus X: children broadcasting their step to the ticker
//! - Heroes: async load with a loading state and a success or failure follow-up
//!
//! Model changes reach the terminal through a push session: every commit is
//! queued onto the push loop below, which redraws after each batch.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p mvu-counter
//! cargo run -p mvu-counter -- --push manual --fail
//! # Without push, async loads are rejected with a configuration error
//! cargo run -p mvu-counter -- --push disabled
//! # Log to a file
//! MVU_DEMO_LOG=/tmp/mvu.log RUST_LOG=trace cargo run -p mvu-counter
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mvu_counter::input::spawn_event_poller;
use mvu_counter::{App, Options, Outcome};
use mvu_dispatch::{ConfigError, PushLoop, PushMode, Session, SessionConfig, Tasks};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MVU_DEMO_LOG";

/// Counter TUI - mvu-dispatch demo
#[derive(Parser, Debug)]
#[command(name = "mvu-counter")]
#[command(about = "A counter TUI demonstrating broadcast and async actions")]
struct Args {
    /// Push mode: disabled, manual or automatic (overrides config and MVU_PUSH)
    #[arg(long)]
    push: Option<PushMode>,

    /// Session config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Make the async load fail
    #[arg(long)]
    fail: bool,

    /// Simulated load latency in milliseconds
    #[arg(long, default_value = "800")]
    delay_ms: u64,
}

fn session_config(args: &Args) -> Result<SessionConfig, ConfigError> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_path(path)?,
        None => SessionConfig {
            push: PushMode::Automatic,
        },
    };
    let mut config = config.with_env_overrides()?;
    if let Some(push) = args.push {
        config.push = push;
    }
    Ok(config)
}

fn init_logging() -> io::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = match session_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    info!(push = %config.push, "Starting counter demo");

    let options = Options {
        fail: args.fail,
        load_delay: Duration::from_millis(args.delay_ms),
    };

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &config, options).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &SessionConfig,
    options: Options,
) -> io::Result<()> {
    let cancel_token = CancellationToken::new();

    // Session = push channel + task spawner tied to our shutdown
    let (session, mut push_loop): (Session, PushLoop) = Session::from_config(config);
    let session = session.with_tasks(Tasks::current().with_cancellation(cancel_token.child_token()));

    let mut app = App::mount(&session, options);

    // Event poller
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let _handle = spawn_event_poller(
        event_tx,
        Duration::from_millis(10),
        Duration::from_millis(16),
        cancel_token.clone(),
    );

    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| app.render(frame))?;
            should_render = false;
        }

        tokio::select! {
            Some(raw_event) = event_rx.recv() => {
                match app.handle_event(raw_event) {
                    Outcome::Quit => break,
                    Outcome::Render => should_render = true,
                    Outcome::Ignored => {}
                }
            }

            // Commits queued by dispatches and async follow-ups
            Some(_) = push_loop.tick() => {
                should_render = true;
            }
        }
    }

    cancel_token.cancel();
    Ok(())
}
