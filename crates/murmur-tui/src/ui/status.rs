//! Status bar
//!
//! Displays connection status, the signed-in user and transient messages.

use murmur_app::App;
use murmur_client::{ChatState, ConnectionStatus};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, chat: &ChatState, area: Rect) {
    let connection_status = match chat.status {
        ConnectionStatus::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionStatus::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionStatus::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let user = app.username().map(|name| format!(" | {name}")).unwrap_or_default();
    let notice = app.status_message().map(|msg| format!(" | {msg}")).unwrap_or_default();

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::raw(user),
        Span::styled(notice, Style::default().fg(Color::Yellow)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
