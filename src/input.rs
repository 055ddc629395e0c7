//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  In normal mode keys move the
//! selection; in editing mode they go to the URL input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, InputMode};

/// Something the main loop must do on behalf of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A validated URL to hand to the engine.
    AddSource(String),
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match app.mode {
        InputMode::Normal => {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                KeyCode::Home | KeyCode::Char('g') => app.select_first(),
                KeyCode::End | KeyCode::Char('G') => app.select_last(),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char('a') => app.start_editing(),
                _ => {}
            }
            None
        }
        InputMode::Editing => match key.code {
            KeyCode::Enter => app.submit_input().map(Action::AddSource),
            KeyCode::Esc => {
                app.cancel_editing();
                None
            }
            KeyCode::Backspace => {
                app.input.pop();
                None
            }
            KeyCode::Char(c) => {
                app.input.push(c);
                None
            }
            _ => None,
        },
    }
}
