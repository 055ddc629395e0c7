//! feedmerge: one live, deduplicated post list from many RSS feeds.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ EngineEvent ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ──────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (engine) │  (channel)  │ (mirror) │          │ (render) │
//! └──────────┘             └──────────┘          └──────────┘
//!      ▲  add_source()          ▲
//!      └──────────────────┐     │ handle_key_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`source/`** — relay URLs, the [`Fetch`](source::Fetch) trait and its
//!   HTTP implementation, RSS parsing and the entity types.
//! * **`identity`**, **`merge`**, **`state`** — id stamping, title-based
//!   dedup and the append-only aggregation state.
//! * **`poll`** — the engine: polls every tracked source on a timer, on its
//!   own thread, and publishes state changes.
//! * **`app`** / **`ui`** / **`input`** — the terminal front end.
//! * **`main`** — parses arguments, sets up logging and the terminal, and
//!   runs the event loop.

mod app;
mod config;
mod error;
mod identity;
mod input;
mod logging;
mod merge;
mod poll;
mod source;
mod state;
mod ui;
mod validate;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::warn;

use app::App;
use config::Cli;
use input::Action;
use source::RelayFetcher;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Enters raw mode + alternate screen on construction and restores the
/// terminal when dropped, including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        logging::init(path, &cli.log_level)?;
    }
    install_panic_hook();

    // -- start the engine ----------------------------------------------------
    let fetcher = Arc::new(RelayFetcher::new()?);
    let (engine, mut events) = poll::spawn(fetcher, cli.engine_config());
    let mut app = App::new();

    for candidate in cli.initial_sources() {
        match app.validate(&candidate) {
            Some(url) => {
                let reply = engine.add_source(url.clone());
                app.track_submission(url, reply);
            }
            None => warn!("Skipping source {:?}: {}", candidate, app.status),
        }
    }

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // ~10 fps.  Each iteration drains engine events and submission replies,
    // renders, then waits up to one tick for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }
        app.poll_submissions();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(Action::AddSource(url)) = input::handle_key_event(&mut app, key) {
                    let reply = engine.add_source(url.clone());
                    app.track_submission(url, reply);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}
