use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use xspider_panel_core::keys;
use xspider_panel_core::view as vm;

use crate::app::{App, Screen};
use crate::fields::FIELDS;
use crate::view::{spinner_char, truncate};

/// Settings form with the confirm / undo bar underneath.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).split(area);
    render_form(f, chunks[0], app);
    render_action_bar(f, chunks[1], app);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let settings = &app.state.settings;
    let draft = settings.draft();
    let committed = settings.committed();
    let threshold = vm::threshold_field(&app.state);
    let value_width = (area.width as usize).saturating_sub(30).max(10);

    let title = if app.state.settings_loaded {
        " Settings ".to_string()
    } else {
        format!(" Settings {} loading ", spinner_char(app.tick))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(title);

    let rows: Vec<Row> = FIELDS
        .iter()
        .map(|field| {
            let changed = draft.get(field.key) != committed.get(field.key);
            let disabled = field.key == keys::STOP_THRESH && !threshold.enabled;

            let label_style = if disabled {
                Style::default().fg(theme.dim)
            } else {
                Style::default().fg(theme.text)
            };
            let mut value_spans = vec![Span::styled(
                truncate(&field.display(draft), value_width),
                if disabled {
                    Style::default().fg(theme.dim)
                } else {
                    Style::default().fg(theme.accent)
                },
            )];
            if disabled && let Some(hint) = threshold.hint {
                value_spans.push(Span::styled(
                    format!("  ({})", hint),
                    Style::default().fg(theme.dim),
                ));
            }
            if field.key == keys::SAVE_PATH {
                value_spans.push(match app.state.save_path_ok {
                    Some(true) => Span::styled("  \u{2713}", Style::default().fg(theme.success)),
                    Some(false) => Span::styled(
                        "  \u{2717} not usable",
                        Style::default().fg(theme.failed),
                    ),
                    None => Span::raw(""),
                });
            }

            Row::new(vec![
                Cell::from(if changed { "*" } else { " " })
                    .style(Style::default().fg(theme.paused)),
                Cell::from(field.label).style(label_style),
                Cell::from(Line::from(value_spans)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(22),
            Constraint::Min(10),
        ],
    )
    .block(block)
    .row_highlight_style(theme.highlight_style());

    let mut table_state = TableState::default();
    table_state.select(Some(app.cursor_for(Screen::Settings)));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_action_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let bar = vm::action_bar(&app.state);
    if !bar.visible {
        return;
    }
    let line = if bar.saving {
        Line::from(Span::styled(
            format!(" {} saving\u{2026}", spinner_char(app.tick)),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                " Unsaved changes ",
                Style::default().fg(theme.paused).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  w", theme.key_style()),
            Span::styled(" confirm", Style::default().fg(theme.text)),
            Span::styled("   u", theme.key_style()),
            Span::styled(" undo", Style::default().fg(theme.text)),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}
