mod update;

#[cfg(test)]
mod tests;

use std::ops::Range;
use std::path::PathBuf;

use tokio::sync::mpsc;
use xspider_panel_core::{
    Appearance, BackendCommand, BackendEvent, PanelState, ThemePreference, keys,
};

use crate::config_file;
use crate::fields::FIELDS;
use crate::theme::Theme;

/// Which screen is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Queue,
    History,
    Finished,
    Settings,
    Log,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Self::Queue,
        Self::History,
        Self::Finished,
        Self::Settings,
        Self::Log,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Queue => "Queue",
            Self::History => "History",
            Self::Finished => "Finished",
            Self::Settings => "Settings",
            Self::Log => "Log",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextInput,
    /// An alert or a pending confirmation owns the keyboard.
    Modal,
}

/// What the text box is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    AddTasks,
    EditSetting(&'static str),
}

impl InputTarget {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::AddTasks => "Profile ids or links (space or comma separated)",
            Self::EditSetting(key) => FIELDS
                .iter()
                .find(|f| f.key == key)
                .map(|f| f.label)
                .unwrap_or(key),
        }
    }
}

pub struct App {
    pub state: PanelState,
    pub theme: Theme,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub input_target: Option<InputTarget>,
    pub input_buffer: String,
    /// Selected row per screen, indexed like `Screen::ALL`.
    pub cursors: [usize; 5],
    /// Keep the log view pinned to the newest line.
    pub log_follow: bool,
    pub show_help: bool,
    pub should_quit: bool,
    pub tick: usize,
    pub visible_rows: usize,
    /// Column ranges of the tab labels, filled in while rendering.
    pub tab_hits: Vec<(Range<u16>, Screen)>,
    pub tab_row: u16,
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
    /// Where the applied theme preference is remembered. `None` disables it.
    pub prefs_path: Option<PathBuf>,
    saved_theme: ThemePreference,
}

impl App {
    pub fn new(theme: ThemePreference, os: Appearance) -> Self {
        let state = PanelState::new(theme, os);
        let palette = Theme::for_appearance(state.theme.effective());
        Self {
            state,
            theme: palette,
            screen: Screen::Queue,
            input_mode: InputMode::Normal,
            input_target: None,
            input_buffer: String::new(),
            cursors: [0; 5],
            log_follow: true,
            show_help: false,
            should_quit: false,
            tick: 0,
            visible_rows: 20,
            tab_hits: Vec::new(),
            tab_row: 0,
            backend_cmd_tx: None,
            prefs_path: None,
            saved_theme: theme,
        }
    }

    /// Send the commands the panel issues once at startup.
    pub fn start(&mut self) {
        let commands = self.state.startup();
        self.send(commands);
    }

    /// Apply one inbound event and forward its follow-up commands.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        let commands = self.state.apply(event);
        self.send(commands);
        self.after_change();
    }

    pub fn view(&mut self, f: &mut ratatui::Frame) {
        crate::view::render(f, self);
    }

    pub fn send(&self, commands: Vec<BackendCommand>) {
        let Some(tx) = &self.backend_cmd_tx else {
            return;
        };
        for command in commands {
            if tx.send(command).is_err() {
                tracing::warn!("command worker is gone");
                return;
            }
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.screen.index()]
    }

    pub fn cursor_for(&self, screen: Screen) -> usize {
        self.cursors[screen.index()]
    }

    pub fn set_cursor(&mut self, value: usize) {
        self.cursors[self.screen.index()] = value;
    }

    /// Row count of the current screen's list.
    pub fn row_count(&self, screen: Screen) -> usize {
        match screen {
            Screen::Queue => self.state.queue.len(),
            Screen::History => self.state.history.len(),
            Screen::Finished => self.state.finished.len(),
            Screen::Settings => FIELDS.len(),
            Screen::Log => self.state.notify.log_lines().len(),
        }
    }

    pub fn selected_task_id(&self) -> Option<String> {
        self.state
            .queue
            .get()
            .get(self.cursor_for(Screen::Queue))
            .map(|t| t.id.clone())
    }

    pub fn selected_history_id(&self) -> Option<String> {
        self.state
            .history
            .get(self.cursor_for(Screen::History))
            .map(|h| h.id.clone())
    }

    /// Re-derive everything that follows from panel state: palette, the
    /// remembered theme, input mode and cursor bounds.
    fn after_change(&mut self) {
        self.sync_theme();
        self.sync_input_mode();
        self.clamp_cursors();
    }

    fn sync_theme(&mut self) {
        let effective = self.state.theme.effective();
        if self.theme.appearance != effective {
            self.theme = Theme::for_appearance(effective);
        }

        let preference = self.state.theme.preference();
        if preference == self.saved_theme {
            return;
        }
        self.saved_theme = preference;
        if let Some(path) = &self.prefs_path {
            match config_file::save_theme(path, preference) {
                Ok(path) => {
                    tracing::debug!(path = %path.display(), %preference, "theme remembered")
                }
                Err(e) => tracing::warn!(error = %e, "could not remember theme"),
            }
        }
    }

    fn sync_input_mode(&mut self) {
        let modal = self.state.notify.current_alert().is_some()
            || self.state.pending_confirmation().is_some();
        self.input_mode = if modal {
            InputMode::Modal
        } else if self.input_target.is_some() {
            InputMode::TextInput
        } else {
            InputMode::Normal
        };
    }

    /// Whether row `index` of `screen` can hold the cursor. The stop
    /// threshold row cannot while deep scan is on.
    pub fn focusable(&self, screen: Screen, index: usize) -> bool {
        !(screen == Screen::Settings
            && !self.state.threshold_enabled()
            && FIELDS.get(index).is_some_and(|f| f.key == keys::STOP_THRESH))
    }

    /// Nearest in-bounds focusable row to `index`, looking `forward` first.
    fn settle(&self, screen: Screen, index: usize, forward: bool) -> usize {
        let len = self.row_count(screen);
        if len == 0 {
            return 0;
        }
        let index = index.min(len - 1);
        if self.focusable(screen, index) {
            return index;
        }
        let next = index.checked_add(1).filter(|i| *i < len);
        let prev = index.checked_sub(1);
        let order = if forward { [next, prev] } else { [prev, next] };
        order
            .into_iter()
            .flatten()
            .find(|i| self.focusable(screen, *i))
            .unwrap_or(index)
    }

    fn clamp_cursors(&mut self) {
        for screen in Screen::ALL {
            let current = self.cursors[screen.index()];
            let next = if screen == Screen::Log && self.log_follow {
                self.row_count(screen).saturating_sub(1)
            } else {
                self.settle(screen, current, true)
            };
            self.cursors[screen.index()] = next;
        }
    }
}
