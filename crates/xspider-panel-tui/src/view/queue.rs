use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use xspider_panel_core::TaskControl;
use xspider_panel_core::view::{self as vm, StatusTone};

use crate::app::{App, Screen};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

/// Render the task queue: a summary line and the task table.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);
    render_summary(f, chunks[0], app);
    render_table(f, chunks[1], app);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = &app.state;
    let tasks = state.queue.get();
    let active = tasks.iter().filter(|t| t.status.is_active()).count();

    let spans = vec![
        Span::styled(
            format!(" {} tasks", tasks.len()),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(", {} active", active), Style::default().fg(theme.dim)),
        Span::styled("   s ", theme.key_style()),
        Span::styled(
            vm::engine_toggle_label(state.engine_running),
            Style::default().fg(theme.text),
        ),
        Span::styled("   L ", theme.key_style()),
        Span::styled(vm::login_label(state.logged_in), Style::default().fg(theme.text)),
        Span::styled("   E ", theme.key_style()),
        Span::styled("Export cookies", Style::default().fg(theme.text)),
        Span::styled("   P/R ", theme.key_style()),
        Span::styled("Pause/resume all", Style::default().fg(theme.text)),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn status_marker(tone: StatusTone, tick: usize) -> char {
    match tone {
        StatusTone::Active => spinner_char(tick),
        StatusTone::Waiting => '\u{25CB}',
        StatusTone::Paused => '\u{2016}',
        StatusTone::Failed => '\u{2717}',
        StatusTone::Neutral => '\u{00B7}',
    }
}

fn control_style(theme: &Theme, control: TaskControl) -> Style {
    match control {
        TaskControl::Pause => Style::default().fg(theme.paused),
        TaskControl::Start => Style::default().fg(theme.active),
        TaskControl::Restart => Style::default().fg(theme.failed),
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let rows_vm = vm::task_rows(app.state.queue.get());
    let name_width = (area.width as usize).saturating_sub(44).max(12);

    let header = Row::new(vec!["", "Name", "Status", "Progress", "Action"])
        .style(theme.header_style())
        .height(1);

    let rows: Vec<Row> = rows_vm
        .iter()
        .map(|row| {
            let color = theme.tone_color(row.tone);
            Row::new(vec![
                Cell::from(status_marker(row.tone, app.tick).to_string())
                    .style(Style::default().fg(color)),
                Cell::from(truncate(&row.name, name_width)).style(Style::default().fg(theme.text)),
                Cell::from(row.status).style(Style::default().fg(color)),
                Cell::from(row.progress.clone().unwrap_or_default())
                    .style(Style::default().fg(theme.dim)),
                Cell::from(row.control.label()).style(control_style(theme, row.control)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Task queue ");

    if rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  Queue is empty. Press a to add profiles, l for likes, b for bookmarks.",
            Style::default().fg(theme.dim),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let widths = [
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(16),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.highlight_style());

    let mut table_state = TableState::default();
    table_state.select(Some(app.cursor_for(Screen::Queue)));
    f.render_stateful_widget(table, area, &mut table_state);
}
