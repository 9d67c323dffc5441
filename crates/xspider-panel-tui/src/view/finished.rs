use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use xspider_panel_core::view as vm;

use crate::app::{App, Screen};

pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Finished this session ");

    if app.state.finished.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  Nothing finished yet.",
            Style::default().fg(theme.dim),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .state
        .finished
        .iter()
        .map(vm::finished_row)
        .map(|row| {
            Row::new(vec![
                Cell::from(row.name).style(Style::default().fg(theme.text)),
                Cell::from(row.time).style(Style::default().fg(theme.dim)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(20)])
        .header(Row::new(vec!["Name", "Finished at"]).style(theme.header_style()))
        .block(block)
        .row_highlight_style(theme.highlight_style());

    let mut table_state = TableState::default();
    table_state.select(Some(app.cursor_for(Screen::Finished)));
    f.render_stateful_widget(table, area, &mut table_state);
}
