//! Sidebar
//!
//! Room list, online roster (without ourselves) and the "create room" field.

use murmur_app::{App, Focus};
use murmur_client::ChatState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::border_style;

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const ROOM_PREFIX: &str = "#";
const NEW_ROOM_HEIGHT: u16 = 3;

/// Render the sidebar.
pub fn render(frame: &mut Frame, app: &App, chat: &ChatState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Min(3),
            Constraint::Length(NEW_ROOM_HEIGHT),
        ])
        .split(area);

    let [rooms_area, users_area, new_room_area] = chunks.as_ref() else {
        return;
    };

    render_rooms(frame, app, *rooms_area);
    render_users(frame, app, chat, *users_area);
    render_new_room(frame, app, *new_room_area);
}

fn render_rooms(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .rooms()
        .iter()
        .enumerate()
        .map(|(idx, room)| {
            let active = !app.is_private_view() && room == app.active_room();
            let prefix = if active { ACTIVE_PREFIX } else { INACTIVE_PREFIX };
            let mut style = if active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if app.focus() == Focus::Rooms && idx == app.room_cursor() {
                style = style.add_modifier(Modifier::REVERSED);
            }

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("{ROOM_PREFIX}{room}"), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Rooms ")
        .border_style(border_style(app, Focus::Rooms));
    frame.render_widget(List::new(items).block(block), area);
}

fn render_users(frame: &mut Frame, app: &App, chat: &ChatState, area: Rect) {
    let users = app.visible_users(chat);
    let peer = app.selected_peer().map(|p| &p.id);

    let items: Vec<ListItem> = if users.is_empty() {
        vec![ListItem::new(Span::styled(" nobody else", Style::default().fg(Color::DarkGray)))]
    } else {
        users
            .iter()
            .enumerate()
            .map(|(idx, user)| {
                let selected = peer == Some(&user.id);
                let prefix = if selected { ACTIVE_PREFIX } else { INACTIVE_PREFIX };
                let mut style = if selected {
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Green)
                };
                if app.focus() == Focus::Users && idx == app.user_cursor() {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                ListItem::new(Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(user.display_name().to_string(), style),
                ]))
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Online ({}) ", users.len()))
        .border_style(border_style(app, Focus::Users));
    frame.render_widget(List::new(items).block(block), area);
}

fn render_new_room(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" New room ")
        .border_style(border_style(app, Focus::NewRoom));

    let input = app.new_room_input();
    frame.render_widget(Paragraph::new(input.text().to_string()).block(block), area);

    if app.focus() == Focus::NewRoom {
        let cursor_x =
            area.x.saturating_add(1 + input.cursor() as u16).min(area.right().saturating_sub(2));
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}
