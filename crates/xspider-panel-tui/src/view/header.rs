use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Screen};

/// Tab bar on the left, engine and account status on the right.
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(" X-Spider ", theme.header_style()), Span::raw(" ")];
    let mut x = area.x + 11;
    let mut hits = Vec::with_capacity(Screen::ALL.len());

    for (i, screen) in Screen::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, screen.title());
        let width = label.chars().count() as u16;
        let style = if *screen == app.screen {
            theme.highlight_style().fg(theme.accent)
        } else {
            Style::default().fg(theme.dim)
        };
        hits.push((x..x + width, *screen));
        x += width;
        spans.push(Span::styled(label, style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    let state = &app.state;
    let engine = if state.engine_running {
        Span::styled(
            "\u{25CF} running",
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("\u{25CB} stopped", Style::default().fg(theme.dim))
    };
    let login = match state.logged_in {
        Some(true) => Span::styled("logged in", Style::default().fg(theme.success)),
        Some(false) => Span::styled("not logged in", Style::default().fg(theme.paused)),
        None => Span::styled("checking login", Style::default().fg(theme.dim)),
    };
    let right = Line::from(vec![
        engine,
        Span::styled("  \u{2502}  ", Style::default().fg(theme.border)),
        login,
        Span::styled("  \u{2502}  ", Style::default().fg(theme.border)),
        Span::styled(
            format!("{} ", state.theme.preference()),
            Style::default().fg(theme.dim),
        ),
        Span::styled(
            chrono::Local::now().format("%H:%M ").to_string(),
            Style::default().fg(theme.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(right).alignment(Alignment::Right), area);

    app.tab_hits = hits;
    app.tab_row = area.y;
}
