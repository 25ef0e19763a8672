//! UI rendering
//!
//! Rendering functions that convert App and chat state into terminal output
//! using ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing widget trees.

mod chat;
mod input;
mod join;
mod sidebar;
mod status;

pub use chat::message_line;
use murmur_app::{App, Focus};
use murmur_client::ChatState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, chat: &ChatState) {
    if app.session().is_none() {
        join::render(frame, app, chat, frame.area());
        return;
    }

    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, chat, *main_area);
    input::render(frame, app, chat, *input_area);
    status::render(frame, app, chat, *status_area);
}

/// Render the main area (sidebar + chat).
fn render_main_area(frame: &mut Frame, app: &App, chat: &ChatState, area: Rect) {
    const SIDEBAR_WIDTH: u16 = 22;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(CHAT_AREA_MIN_WIDTH)])
        .split(area);

    let [sidebar_area, chat_area] = chunks.as_ref() else {
        return;
    };

    sidebar::render(frame, app, chat, *sidebar_area);
    chat::render(frame, app, chat, *chat_area);
}

/// Border style for a widget, highlighted when it has focus.
fn border_style(app: &App, widget: Focus) -> Style {
    if app.focus() == widget {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}
