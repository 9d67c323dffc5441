use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(66, 42, f.area());

    let lines = vec![
        Line::from(Span::styled(" Keyboard Shortcuts ", theme.header_style())),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}  k / \u{2191}", "Move down / up", theme),
        key_line("Ctrl+d / Ctrl+u", "Page down / up", theme),
        key_line("g / G", "Go to top / bottom", theme),
        key_line("Tab / Shift+Tab", "Next / previous screen", theme),
        key_line("1 .. 5", "Queue, History, Finished, Settings, Log", theme),
        Line::from(""),
        section_header("Engine", theme),
        key_line("s", "Start / stop the engine", theme),
        key_line("P / R", "Pause / resume all tasks", theme),
        key_line("L", "Log in or update cookies", theme),
        key_line("E", "Export cookies", theme),
        key_line("r", "Refresh", theme),
        Line::from(""),
        section_header("Queue & history", theme),
        key_line("a", "Add profiles", theme),
        key_line("l / b", "Add my likes / bookmarks", theme),
        key_line("Enter", "Pause, start or restart task / re-add history", theme),
        key_line("x", "Delete task / history record", theme),
        key_line("C", "Clear queue / history / log", theme),
        Line::from(""),
        section_header("Settings", theme),
        key_line("Enter", "Edit, toggle or cycle the field", theme),
        key_line("\u{2190} / \u{2192}", "Step the value", theme),
        key_line("o", "Pick the save folder", theme),
        key_line("w / Ctrl+s", "Confirm changes", theme),
        key_line("u", "Undo changes", theme),
        key_line("D", "Reset to defaults", theme),
        key_line("t", "Cycle theme (light, dark, system)", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("?", "This help (any key closes it)", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<18}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
