//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads the mirrored
//! aggregation state; the list selection is the one piece of [`App`] it
//! updates, because ratatui keeps scroll offsets there.
//!
//! Layout, top to bottom: tracked feeds, posts, the selected post's detail
//! (when open), the URL input (when editing) and a one-line status bar.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let feeds_height = u16::try_from(app.view.feeds().len())
        .unwrap_or(u16::MAX)
        .clamp(1, 6)
        + 2;
    let detail_height = if app.show_detail { 8 } else { 0 };
    let input_height = if app.mode == InputMode::Editing { 3 } else { 0 };

    let [feeds_area, posts_area, detail_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(feeds_height),
        Constraint::Min(1),
        Constraint::Length(detail_height),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feeds(app, frame, feeds_area);
    draw_posts(app, frame, posts_area);
    if app.show_detail {
        draw_detail(app, frame, detail_area);
    }
    if app.mode == InputMode::Editing {
        draw_input(app, frame, input_area);
    }
    draw_status_bar(app, frame, status_area);
}

fn draw_feeds(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .view
        .feeds()
        .iter()
        .map(|feed| {
            ListItem::new(Line::from(vec![
                Span::styled(&feed.title, Style::default().fg(Color::Cyan)),
                Span::raw("  "),
                Span::styled(&feed.description, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().title(" Feeds ").borders(Borders::ALL));
    frame.render_widget(list, area);
}

/// Render the scrollable post list in aggregation order.
fn draw_posts(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .posts()
        .iter()
        .map(|post| {
            let date_str = post
                .published
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "no date".into());

            let title_style = if app.is_read(post) {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            };
            let feed_name = app
                .view
                .feed(post.feed_id)
                .map(|f| f.title.as_str())
                .unwrap_or("?");

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", date_str), Style::default().fg(Color::DarkGray)),
                Span::raw(" "),
                Span::styled(post.title.clone(), title_style),
                Span::raw("  "),
                Span::styled(format!("[{feed_name}]"), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Posts ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let Some(post) = app.selected_post() else {
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            post.link.as_deref().unwrap_or("(no link)"),
            Style::default().fg(Color::Blue),
        )),
        Line::from(post.description.as_deref().unwrap_or("(no description)")),
    ];
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(format!(" {} ", post.title)).borders(Borders::ALL));
    frame.render_widget(detail, area);
}

fn draw_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .title(" RSS link (Enter: add, Esc: cancel) ")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let cycle = match app.last_cycle {
        Some((n, sources)) => format!("cycle {n} · {sources} feeds"),
        None => "waiting".to_string(),
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} posts", app.posts().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(cycle, Style::default().fg(Color::DarkGray)),
        Span::raw("  a: add  Enter: details  q: quit  ↑/↓: scroll"),
    ]));
    frame.render_widget(status, area);
}
