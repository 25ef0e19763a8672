//! Chat area
//!
//! Displays the active room feed or the private conversation with the
//! selected peer, plus the typing indicator.

use murmur_app::App;
use murmur_client::ChatState;
use murmur_proto::ChatMessage;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, chat: &ChatState, area: Rect) {
    let (title, messages): (String, Vec<&ChatMessage>) = match app.selected_peer() {
        Some(peer) => {
            (format!(" @{} ", peer.display_name()), app.private_log(&peer.id).iter().collect())
        },
        None => (format!(" #{} ", app.active_room()), app.room_feed(chat).collect()),
    };

    let mut items: Vec<ListItem> = if messages.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        messages.into_iter().map(|msg| ListItem::new(message_line(msg))).collect()
    };

    if !app.is_private_view()
        && let Some(line) = chat.typing_line(app.username().unwrap_or_default())
    {
        items.push(ListItem::new(Line::from(Span::styled(
            line,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))));
    }

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(List::new(visible_items).block(block), area);
}

/// One rendered message line.
///
/// `[HH:MM:SS] sender: text  reactions  ✓readers  #id`; system notices are
/// dimmed and carry no sender.
pub fn message_line(msg: &ChatMessage) -> Line<'static> {
    let mut spans = Vec::new();

    let time = msg.display_time();
    if !time.is_empty() {
        spans.push(Span::styled(format!("[{time}] "), Style::default().fg(Color::DarkGray)));
    }

    if msg.system {
        spans.push(Span::styled(
            format!("* {}", msg.message),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
        return Line::from(spans);
    }

    spans.push(Span::styled(
        format!("{}:", msg.sender_or_anonymous()),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(format!(" {}", msg.message)));

    if let Some(reactions) = msg.reaction_summary() {
        spans.push(Span::styled(format!("  {reactions}"), Style::default().fg(Color::Yellow)));
    }
    if let Some(readers) = msg.read_count() {
        spans.push(Span::styled(format!("  ✓{readers}"), Style::default().fg(Color::Cyan)));
    }
    if let Some(id) = &msg.id {
        spans.push(Span::styled(format!("  #{id}"), Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

