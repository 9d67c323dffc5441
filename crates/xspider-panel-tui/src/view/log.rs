use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::app::{App, Screen};

pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let lines = app.state.notify.log_lines();

    let items: Vec<ListItem> = lines
        .iter()
        .map(|line| {
            let color = theme.level_color(line.level);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", line.time), Style::default().fg(theme.dim)),
                Span::styled(
                    format!("{:<5} ", line.level.label()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(line.message.as_str(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let title = if app.log_follow {
        format!(" Log ({}) ", lines.len())
    } else {
        format!(" Log ({}) \u{2013} paused, G to follow ", lines.len())
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .highlight_style(theme.highlight_style());

    let mut state = ListState::default();
    if !lines.is_empty() {
        state.select(Some(app.cursor_for(Screen::Log)));
    }
    f.render_stateful_widget(list, area, &mut state);
}
