pub mod finished;
pub mod header;
pub mod help;
pub mod history;
pub mod log;
pub mod overlay;
pub mod queue;
pub mod settings;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Screen};

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

/// Draw the whole panel: header, current screen, footer, then overlays.
pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    header::render(f, chunks[0], app);

    let body = chunks[1];
    match app.screen {
        Screen::Queue => queue::render_in(f, app, body),
        Screen::History => history::render_in(f, app, body),
        Screen::Finished => finished::render_in(f, app, body),
        Screen::Settings => settings::render_in(f, app, body),
        Screen::Log => log::render_in(f, app, body),
    }

    render_footer(f, chunks[2], app);

    overlay::render_toasts(f, body, app);
    if app.input_target.is_some() {
        overlay::render_input(f, app);
    }
    if app.show_help {
        help::render(f, &app.theme);
    }
    overlay::render_modal(f, app);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = match app.screen {
        Screen::Queue => &[
            ("a", "add"),
            ("l/b", "likes/bookmarks"),
            ("Enter", "pause/start"),
            ("x", "delete"),
            ("C", "clear"),
            ("s", "engine"),
        ],
        Screen::History => &[
            ("Enter", "re-add"),
            ("x", "delete"),
            ("C", "clear all"),
            ("r", "refresh"),
        ],
        Screen::Finished => &[("r", "refresh")],
        Screen::Settings => &[
            ("Enter", "edit"),
            ("\u{2190}/\u{2192}", "change"),
            ("o", "pick folder"),
            ("w", "save"),
            ("u", "undo"),
            ("D", "defaults"),
        ],
        Screen::Log => &[("g/G", "top/bottom"), ("C", "clear")],
    };

    let theme = &app.theme;
    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints
        .iter()
        .chain([("Tab", "screens"), ("?", "help"), ("q", "quit")].iter())
    {
        spans.push(Span::styled(*key, theme.key_style()));
        spans.push(Span::styled(format!(" {}  ", label), theme.footer_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
