use std::time::Instant;

use xspider_panel_core::threshold::DISABLED_HINT;
use xspider_panel_core::{BackendCommand, LogLevel, SettingValue, keys};

use super::{App, InputMode, InputTarget, Screen};
use crate::action::Action;
use crate::fields::{self, Field};

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.state.notify.expire_toasts(Instant::now());
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(6);
            }
            Action::None => {}
            Action::OsAppearance(os) => {
                self.state.os_appearance_changed(os);
            }
            other => match self.input_mode {
                InputMode::Modal => self.update_modal(other),
                InputMode::TextInput => self.update_text_input(other),
                InputMode::Normal if self.show_help => {
                    // Any key closes the help overlay.
                    self.show_help = false;
                }
                InputMode::Normal => self.update_normal(other),
            },
        }
        self.after_change();
        false
    }

    fn update_modal(&mut self, action: Action) {
        let yes = match action {
            Action::ModalYes => true,
            Action::ModalNo => false,
            _ => return,
        };
        if self.state.notify.dismiss_alert().is_some() {
            return;
        }
        if yes {
            let commands = self.state.confirm_pending();
            self.send(commands);
        } else {
            self.state.cancel_pending();
        }
    }

    fn update_text_input(&mut self, action: Action) {
        match action {
            Action::InputChar(c) => self.input_buffer.push(c),
            Action::InputBackspace => {
                self.input_buffer.pop();
            }
            Action::InputCancel => self.close_input(),
            Action::InputSubmit => {
                let text = std::mem::take(&mut self.input_buffer);
                match self.input_target.take() {
                    Some(InputTarget::AddTasks) => {
                        let commands = self.state.add_tasks(&text);
                        self.send(commands);
                    }
                    Some(InputTarget::EditSetting(key)) => {
                        if let Some(field) = fields::field_for(key) {
                            match field.parse(&text) {
                                Ok(value) => self.apply_field(field, value),
                                Err(msg) => self.warn(msg),
                            }
                        }
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn update_normal(&mut self, action: Action) {
        match action {
            Action::MoveDown => self.move_cursor(1),
            Action::MoveUp => self.move_cursor(-1),
            Action::PageDown => self.move_cursor(self.visible_rows.max(1) as isize),
            Action::PageUp => self.move_cursor(-(self.visible_rows.max(1) as isize)),
            Action::GoTop => {
                let top = self.settle(self.screen, 0, true);
                self.set_cursor(top);
                if self.screen == Screen::Log {
                    self.log_follow = false;
                }
            }
            Action::GoBottom => {
                let len = self.row_count(self.screen);
                let bottom = self.settle(self.screen, len.saturating_sub(1), false);
                self.set_cursor(bottom);
                if self.screen == Screen::Log {
                    self.log_follow = true;
                }
            }
            Action::NextScreen => self.show_screen(self.screen.next()),
            Action::PrevScreen => self.show_screen(self.screen.prev()),
            Action::ShowScreen(screen) => self.show_screen(screen),
            Action::ClickAt(x, y) => {
                if y == self.tab_row
                    && let Some(screen) = self
                        .tab_hits
                        .iter()
                        .find(|(cols, _)| cols.contains(&x))
                        .map(|(_, s)| *s)
                {
                    self.show_screen(screen);
                }
            }
            Action::ToggleHelp => self.show_help = true,

            Action::ToggleEngine => {
                let commands = self.state.toggle_engine();
                self.send(commands);
            }
            Action::PauseAll => {
                let commands = self.state.pause_all();
                self.send(commands);
            }
            Action::ResumeAll => {
                let commands = self.state.resume_all();
                self.send(commands);
            }
            Action::Login => {
                let commands = self.state.login();
                self.send(commands);
            }
            Action::ExportCookies => {
                let commands = self.state.export_cookies();
                self.send(commands);
            }
            Action::Refresh => {
                let mut commands = self.state.refresh();
                match self.screen {
                    Screen::History => commands.extend(self.state.load_stats()),
                    Screen::Finished => commands.extend(self.state.load_finished()),
                    _ => {}
                }
                self.send(commands);
            }
            Action::CycleTheme => {
                let next = self.state.theme.preference().cycle();
                self.state.select_theme(next);
            }

            Action::StartAddTasks => {
                self.input_buffer.clear();
                self.input_target = Some(InputTarget::AddTasks);
            }
            Action::AddMyLikes => {
                let commands = self.state.add_my_likes();
                self.send(commands);
            }
            Action::AddMyBookmarks => {
                let commands = self.state.add_my_bookmarks();
                self.send(commands);
            }
            Action::Activate => self.activate(),
            Action::DeleteSelected => match self.screen {
                Screen::Queue => {
                    if let Some(id) = self.selected_task_id() {
                        let commands = self.state.delete_task(&id);
                        self.send(commands);
                    }
                }
                Screen::History => {
                    if let Some(id) = self.selected_history_id() {
                        self.state.request_delete_history(&id);
                    }
                }
                _ => {}
            },
            Action::ClearAll => match self.screen {
                Screen::Queue => {
                    let commands = self.state.clear_tasks();
                    self.send(commands);
                }
                Screen::History => self.state.request_clear_history(),
                Screen::Log => {
                    self.state.notify.clear_log();
                    self.log_follow = true;
                }
                _ => {}
            },

            Action::Increase | Action::Decrease if self.screen == Screen::Settings => {
                if let Some(field) = fields::field_at(self.cursor())
                    && let Some(value) =
                        field.stepped(self.state.settings.draft(), action == Action::Increase)
                {
                    self.apply_field(field, value);
                }
            }
            Action::SaveSettings => {
                let commands = self.state.confirm_settings();
                self.send(commands);
            }
            Action::UndoSettings if self.screen == Screen::Settings => {
                self.state.undo_settings();
            }
            Action::ResetSettings if self.screen == Screen::Settings => {
                self.state.reset_settings();
            }
            Action::SelectFolder if self.screen == Screen::Settings => {
                let commands = self.state.select_folder();
                self.send(commands);
            }
            _ => {}
        }
    }

    /// Enter on the selected row of the current screen.
    fn activate(&mut self) {
        match self.screen {
            Screen::Queue => {
                if let Some(id) = self.selected_task_id() {
                    let commands = self.state.task_primary_control(&id);
                    self.send(commands);
                }
            }
            Screen::History => {
                if let Some(id) = self.selected_history_id() {
                    let commands = self.state.re_add_history(&id);
                    self.send(commands);
                }
            }
            Screen::Settings => {
                let Some(field) = fields::field_at(self.cursor()) else {
                    return;
                };
                if field.key == keys::STOP_THRESH && !self.state.threshold_enabled() {
                    self.warn(format!("{}: {}", field.label, DISABLED_HINT));
                } else if field.is_editable_text() {
                    self.input_buffer = match self.state.settings.draft().get(field.key) {
                        Some(v) => v.to_string(),
                        None => String::new(),
                    };
                    self.input_target = Some(InputTarget::EditSetting(field.key));
                } else if let Some(value) = field.stepped(self.state.settings.draft(), true) {
                    self.apply_field(field, value);
                }
            }
            Screen::Finished | Screen::Log => {}
        }
    }

    fn apply_field(&mut self, field: &Field, value: SettingValue) {
        if !self.state.set_setting(field.key, value) {
            let reason = if field.key == keys::STOP_THRESH {
                DISABLED_HINT
            } else {
                "invalid value"
            };
            self.warn(format!("{}: {}", field.label, reason));
        }
    }

    fn show_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        let commands = match screen {
            Screen::History => {
                let mut c = vec![BackendCommand::LoadHistory];
                c.extend(self.state.load_stats());
                c
            }
            Screen::Finished => self.state.load_finished(),
            _ => Vec::new(),
        };
        self.send(commands);
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.row_count(self.screen);
        if len == 0 {
            return;
        }
        let next = (self.cursor() as isize + delta).clamp(0, len as isize - 1) as usize;
        let next = self.settle(self.screen, next, delta > 0);
        self.set_cursor(next);
        if self.screen == Screen::Log {
            self.log_follow = next + 1 == len;
        }
    }

    fn close_input(&mut self) {
        self.input_target = None;
        self.input_buffer.clear();
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.state
            .notify
            .toast(message, LogLevel::Warning, Instant::now());
    }
}
