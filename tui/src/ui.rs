use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use tagtree_core::tree::{TextColor, TextEmphasis};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());

    render_tree(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_tree(frame: &mut Frame, app: &App, area: Rect) {
    let model = app.model.borrow();
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let attrs = model.display_attributes(&row.node);
            let marker = if row.has_children {
                if row.expanded {
                    "▾ "
                } else {
                    "▸ "
                }
            } else {
                "  "
            };
            let indent = "  ".repeat(row.depth);

            let mut style = Style::default();
            if attrs.emphasis == TextEmphasis::Italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if attrs.color == TextColor::Muted {
                style = style.fg(Color::DarkGray);
            }
            if i == app.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }

            ListItem::new(Line::from(Span::styled(
                format!("{}{}{}", indent, marker, attrs.label),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Tags "));
    frame.render_widget(list, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.status),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            "↑/↓ move  →/← expand/collapse  enter activate  t tag  u untag  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
