//! Join screen
//!
//! Username prompt shown before a session exists.

use murmur_app::App;
use murmur_client::ChatState;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const BOX_WIDTH: u16 = 44;
const BOX_HEIGHT: u16 = 6;
const PROMPT: &str = "Username: ";

/// Render the join screen.
pub fn render(frame: &mut Frame, app: &App, _chat: &ChatState, area: Rect) {
    let [row] = Layout::vertical([Constraint::Length(BOX_HEIGHT)]).flex(Flex::Center).areas(area);
    let [area] = Layout::horizontal([Constraint::Length(BOX_WIDTH)]).flex(Flex::Center).areas(row);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Join Murmur ")
        .border_style(Style::default().fg(Color::Yellow));

    let input = app.join_input();
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(PROMPT, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(input.text().to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to join, Esc to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);

    let cursor_x = area
        .x
        .saturating_add(1 + PROMPT.len() as u16 + input.cursor() as u16)
        .min(area.right().saturating_sub(2));
    frame.set_cursor_position((cursor_x, area.y.saturating_add(2)));
}
