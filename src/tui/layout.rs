use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::ItemKind;
use crate::tui::app::TuiApp;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0], colors);
    render_queue(frame, app, chunks[1], colors);
    render_status_bar(frame, app, chunks[2], colors);
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let title = app.title.as_deref().unwrap_or("(no thread loaded)");

    let block = Block::default()
        .title(" murmur ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let paragraph = Paragraph::new(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .block(block);

    frame.render_widget(paragraph, area);
}

fn render_queue(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let (label, style) = match item.kind {
                ItemKind::Title | ItemKind::Body => (
                    item.display_label(),
                    Style::default().fg(colors.post_item),
                ),
                ItemKind::Comment => {
                    let indent = "  ".repeat(item.depth.unwrap_or(0) as usize);
                    (
                        format!("{}{}", indent, item.display_label()),
                        Style::default().fg(colors.comment_item),
                    )
                }
            };

            let content = format!("{}: {}", label, truncate(&item.text, width));
            ListItem::new(content).style(style)
        })
        .collect();

    let title = format!(
        " Queue ({}) [{}/{}] ",
        app.items.len(),
        (app.playback.cursor + 1).min(app.items.len().max(1)),
        app.items.len().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.active_item_bg)
                .fg(colors.active_item_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if app.is_extracting {
        format!(
            "Extracting... {:.0}%  (x to stop)",
            app.progress * 100.0
        )
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        let transport = if app.playback.is_playing {
            "playing"
        } else if app.playback.is_paused {
            "paused"
        } else {
            "stopped"
        };
        format!(
            "{}  {:.2}x  voices:{}  Space:Play/Pause s:Stop n/p:Next/Prev +/-:Speed u:Voices o:Open q:Quit",
            transport,
            app.playback.speed,
            if app.playback.rotate_voices { "rotate" } else { "single" },
        )
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

fn truncate(text: &str, width: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        return flat;
    }
    let mut out: String = flat.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
