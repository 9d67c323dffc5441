use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use xspider_panel_core::HistoryKind;
use xspider_panel_core::view as vm;

use crate::app::{App, Screen};
use crate::view::truncate;

const STATS_PROFILES: usize = 8;

/// History table on the left, collection stats on the right.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let stats_width = if area.width > 100 { 34 } else { 28 };
    let chunks =
        Layout::horizontal([Constraint::Min(40), Constraint::Length(stats_width)]).split(area);
    render_table(f, chunks[0], app);
    render_stats(f, chunks[1], app);
}

fn kind_icon(kind: HistoryKind) -> &'static str {
    match kind {
        HistoryKind::Profile => "@",
        HistoryKind::Likes => "\u{2665}",
        HistoryKind::Bookmarks => "\u{2691}",
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" History ");

    if app.state.history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No download history yet.",
            Style::default().fg(theme.dim),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(30).max(10);
    let rows: Vec<Row> = app
        .state
        .history
        .iter()
        .map(vm::history_row)
        .map(|row| {
            Row::new(vec![
                Cell::from(kind_icon(row.kind)).style(Style::default().fg(theme.accent)),
                Cell::from(truncate(&row.name, name_width)).style(Style::default().fg(theme.text)),
                Cell::from(row.detail).style(Style::default().fg(theme.dim)),
            ])
        })
        .collect();

    let header = Row::new(vec!["", "Name", "Downloaded"]).style(theme.header_style());
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(24),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(theme.highlight_style());

    let mut table_state = TableState::default();
    table_state.select(Some(app.cursor_for(Screen::History)));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let lines: Vec<Line> = match &app.state.stats {
        Some(stats) => vm::stats_lines(stats, STATS_PROFILES)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let style = if i == 0 {
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                Line::from(Span::styled(format!(" {}", text), style))
            })
            .collect(),
        None => vec![Line::from(Span::styled(
            " No stats loaded",
            Style::default().fg(theme.dim),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Stats ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}
