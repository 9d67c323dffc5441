use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;
use crate::view::{centered_rect, truncate};

const TOAST_WIDTH: u16 = 44;

/// Stack live toasts in the top-right corner of `area`.
pub fn render_toasts(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y;
    for toast in app.state.notify.toasts() {
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 3,
        };
        let color = theme.level_color(toast.level);
        let text = truncate(&toast.message, width.saturating_sub(4) as usize);
        let widget = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(color),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
        y += 3;
    }
}

/// Single-line text box for adding tasks or editing a setting.
pub fn render_input(f: &mut Frame, app: &App) {
    let Some(target) = app.input_target else {
        return;
    };
    let theme = &app.theme;
    let popup = centered_rect(64, 5, f.area());
    let inner_width = popup.width.saturating_sub(4) as usize;

    // Keep the end of the buffer and the cursor visible.
    let chars: Vec<char> = app.input_buffer.chars().collect();
    let start = chars.len().saturating_sub(inner_width.saturating_sub(1));
    let visible: String = chars[start..].iter().collect();

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", target.prompt()),
            Style::default().fg(theme.dim),
        )),
        Line::from(vec![
            Span::styled(format!(" {}", visible), Style::default().fg(theme.text)),
            Span::styled("\u{2588}", Style::default().fg(theme.accent)),
        ]),
        Line::from(vec![
            Span::styled(" Enter", theme.key_style()),
            Span::styled(" submit   ", Style::default().fg(theme.dim)),
            Span::styled("Esc", theme.key_style()),
            Span::styled(" cancel", Style::default().fg(theme.dim)),
        ]),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(" Input "),
    );
    f.render_widget(Clear, popup);
    f.render_widget(widget, popup);
}

/// The front alert, or else the pending confirmation, as a centered dialog.
pub fn render_modal(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let (title, message, color, keys) = if let Some(alert) = app.state.notify.current_alert() {
        (
            alert.title.clone(),
            alert.message.clone(),
            theme.failed,
            vec![("Enter", " ok")],
        )
    } else if let Some(pending) = app.state.pending_confirmation() {
        (
            "Confirm".to_string(),
            pending.prompt(),
            theme.paused,
            vec![("y", " confirm   "), ("n", " cancel")],
        )
    } else {
        return;
    };

    let width = 56u16;
    let text_rows = (message.chars().count() as u16 / width.saturating_sub(4)).max(1) + 1;
    let popup = centered_rect(width, text_rows + 4, f.area());

    let mut key_spans = vec![Span::raw(" ")];
    for (key, label) in keys {
        key_spans.push(Span::styled(key, theme.key_style()));
        key_spans.push(Span::styled(label, Style::default().fg(theme.dim)));
    }
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(key_spans),
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", title)),
    );
    f.render_widget(Clear, popup);
    f.render_widget(widget, popup);
}
