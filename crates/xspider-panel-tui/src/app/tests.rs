use tokio::sync::mpsc;
use xspider_panel_core::worker::Operation;
use xspider_panel_core::{
    Appearance, BackendCommand, BackendEvent, Configuration, EngineError, EngineEvent,
    HistoryEntry, HistoryKind, LogLevel, Task, TaskStatus, ThemePreference, keys,
};

use super::*;
use crate::action::Action;
use crate::config_file;
use crate::fields::FIELDS;

/// App wired to a command channel, no worker behind it.
fn test_app() -> (App, mpsc::UnboundedReceiver<BackendCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(ThemePreference::Dark, Appearance::Dark);
    app.backend_cmd_tx = Some(tx);
    (app, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<BackendCommand>) -> Vec<BackendCommand> {
    let mut out = Vec::new();
    while let Ok(c) = rx.try_recv() {
        out.push(c);
    }
    out
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.update(Action::InputChar(c));
    }
}

fn field_index(key: &str) -> usize {
    FIELDS.iter().position(|f| f.key == key).unwrap()
}

fn loaded_settings() -> Configuration {
    let mut cfg = xspider_panel_core::settings::defaults();
    cfg.set(keys::SAVE_PATH, "D:/x-spider");
    cfg.set(keys::THEME, "dark");
    cfg
}

fn with_settings(app: &mut App, rx: &mut mpsc::UnboundedReceiver<BackendCommand>) {
    app.handle_backend_event(BackendEvent::SettingsLoaded(Ok(loaded_settings())));
    drain(rx);
}

fn with_queue(app: &mut App, tasks: Vec<Task>) {
    app.handle_backend_event(BackendEvent::Engine(EngineEvent::QueuePolled { tasks }));
}

// ── Startup and screens ─────────────────────────────────────────

#[test]
fn start_sends_startup_commands() {
    let (mut app, mut rx) = test_app();
    app.start();
    assert_eq!(
        drain(&mut rx),
        vec![
            BackendCommand::LoadSettings,
            BackendCommand::CheckLogin,
            BackendCommand::QueryEngineStatus,
            BackendCommand::RefreshQueue,
            BackendCommand::LoadHistory,
        ]
    );
}

#[test]
fn tab_cycles_through_every_screen() {
    let (mut app, _rx) = test_app();
    let mut seen = vec![app.screen];
    for _ in 0..Screen::ALL.len() {
        app.update(Action::NextScreen);
        seen.push(app.screen);
    }
    assert_eq!(&seen[..5], &Screen::ALL);
    assert_eq!(app.screen, Screen::Queue);

    app.update(Action::PrevScreen);
    assert_eq!(app.screen, Screen::Log);
}

#[test]
fn entering_history_loads_history_and_stats() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ShowScreen(Screen::History));
    assert_eq!(
        drain(&mut rx),
        vec![BackendCommand::LoadHistory, BackendCommand::LoadStats]
    );

    app.update(Action::ShowScreen(Screen::Finished));
    assert_eq!(drain(&mut rx), vec![BackendCommand::LoadFinished]);
}

#[test]
fn click_on_tab_switches_screen() {
    let (mut app, _rx) = test_app();
    app.tab_row = 0;
    app.tab_hits = vec![(11..20, Screen::Queue), (20..31, Screen::History)];
    app.update(Action::ClickAt(25, 0));
    assert_eq!(app.screen, Screen::History);

    app.update(Action::ClickAt(12, 3));
    assert_eq!(app.screen, Screen::History);
}

#[test]
fn help_closes_on_next_key_without_acting() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ToggleHelp);
    assert!(app.show_help);

    app.update(Action::ToggleEngine);
    assert!(!app.show_help);
    assert!(drain(&mut rx).is_empty());
}

// ── Queue ───────────────────────────────────────────────────────

#[test]
fn add_tasks_through_text_input() {
    let (mut app, mut rx) = test_app();
    app.update(Action::StartAddTasks);
    assert_eq!(app.input_mode, InputMode::TextInput);

    type_text(&mut app, "  alice, bob ");
    app.update(Action::InputSubmit);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.input_buffer.is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![BackendCommand::AddTasks("alice, bob".into())]
    );
}

#[test]
fn blank_add_sends_nothing() {
    let (mut app, mut rx) = test_app();
    app.update(Action::StartAddTasks);
    type_text(&mut app, "   ");
    app.update(Action::InputSubmit);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn cancelled_input_is_discarded() {
    let (mut app, mut rx) = test_app();
    app.update(Action::StartAddTasks);
    type_text(&mut app, "alicx");
    app.update(Action::InputBackspace);
    assert_eq!(app.input_buffer, "alic");
    app.update(Action::InputCancel);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.input_target.is_none());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn enter_on_task_uses_its_control() {
    let (mut app, mut rx) = test_app();
    with_queue(
        &mut app,
        vec![
            Task::new("alice", TaskStatus::Running, 4),
            Task::new("bob", TaskStatus::Error, 0),
        ],
    );

    app.update(Action::Activate);
    app.update(Action::MoveDown);
    app.update(Action::Activate);

    assert_eq!(
        drain(&mut rx),
        vec![
            BackendCommand::PauseTask("alice".into()),
            BackendCommand::StartTask("bob".into()),
        ]
    );
}

#[test]
fn cursor_stays_in_bounds_when_queue_shrinks() {
    let (mut app, _rx) = test_app();
    with_queue(
        &mut app,
        vec![
            Task::new("a", TaskStatus::Queued, 0),
            Task::new("b", TaskStatus::Queued, 0),
            Task::new("c", TaskStatus::Queued, 0),
        ],
    );
    app.update(Action::GoBottom);
    assert_eq!(app.cursor(), 2);

    with_queue(&mut app, vec![Task::new("a", TaskStatus::Queued, 0)]);
    assert_eq!(app.cursor(), 0);
    assert_eq!(app.selected_task_id().as_deref(), Some("a"));
}

#[test]
fn delete_and_clear_on_queue_go_straight_through() {
    let (mut app, mut rx) = test_app();
    with_queue(&mut app, vec![Task::new("alice", TaskStatus::Paused, 1)]);

    app.update(Action::DeleteSelected);
    app.update(Action::ClearAll);

    assert_eq!(
        drain(&mut rx),
        vec![
            BackendCommand::DeleteTask("alice".into()),
            BackendCommand::ClearTasks
        ]
    );
}

#[test]
fn engine_toggle_follows_reported_status() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ToggleEngine);
    assert_eq!(drain(&mut rx), vec![BackendCommand::StartEngine]);

    app.handle_backend_event(BackendEvent::Engine(EngineEvent::EngineStatus { running: true }));
    assert_eq!(drain(&mut rx), vec![BackendCommand::SetPolling(true)]);

    app.update(Action::ToggleEngine);
    assert_eq!(drain(&mut rx), vec![BackendCommand::StopEngine]);
}

// ── History and modals ──────────────────────────────────────────

fn history() -> Vec<HistoryEntry> {
    vec![HistoryEntry {
        id: "alice".into(),
        kind: HistoryKind::Profile,
        name: None,
        count: 3,
    }]
}

#[test]
fn history_delete_needs_confirmation() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ShowScreen(Screen::History));
    app.handle_backend_event(BackendEvent::HistoryLoaded(Ok(history())));
    drain(&mut rx);

    app.update(Action::DeleteSelected);
    assert_eq!(app.input_mode, InputMode::Modal);
    assert!(drain(&mut rx).is_empty());

    // Normal-mode keys are swallowed while the dialog is up.
    app.update(Action::ToggleEngine);
    assert!(drain(&mut rx).is_empty());

    app.update(Action::ModalYes);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(
        drain(&mut rx),
        vec![BackendCommand::DeleteHistoryItem("alice".into())]
    );
}

#[test]
fn history_clear_can_be_cancelled() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ShowScreen(Screen::History));
    drain(&mut rx);

    app.update(Action::ClearAll);
    assert!(app.state.pending_confirmation().is_some());
    app.update(Action::ModalNo);

    assert!(app.state.pending_confirmation().is_none());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn enter_on_history_re_adds() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ShowScreen(Screen::History));
    app.handle_backend_event(BackendEvent::HistoryLoaded(Ok(history())));
    drain(&mut rx);

    app.update(Action::Activate);
    assert_eq!(
        drain(&mut rx),
        vec![BackendCommand::ReAddHistory("alice".into())]
    );
}

#[test]
fn alert_blocks_until_dismissed() {
    let (mut app, _rx) = test_app();
    app.handle_backend_event(BackendEvent::OperationDone {
        op: Operation::StartEngine,
        result: Err(EngineError::Rejected("please log in first".into())),
    });
    assert_eq!(app.input_mode, InputMode::Modal);

    app.update(Action::ModalYes);
    assert!(app.state.notify.current_alert().is_none());
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn alert_over_text_input_returns_to_typing() {
    let (mut app, _rx) = test_app();
    app.update(Action::StartAddTasks);
    type_text(&mut app, "al");
    app.handle_backend_event(BackendEvent::OperationDone {
        op: Operation::Login,
        result: Err(EngineError::Transport("offline".into())),
    });
    assert_eq!(app.input_mode, InputMode::Modal);

    app.update(Action::ModalNo);
    assert_eq!(app.input_mode, InputMode::TextInput);
    assert_eq!(app.input_buffer, "al");
}

// ── Settings ────────────────────────────────────────────────────

#[test]
fn stepping_a_field_dirties_and_confirm_commits() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    app.set_cursor(field_index(keys::CONCURRENCY));

    app.update(Action::Increase);
    assert_eq!(app.state.settings.draft().int(keys::CONCURRENCY), Some(4));
    assert!(app.state.settings.is_dirty());

    app.update(Action::SaveSettings);
    match drain(&mut rx).as_slice() {
        [BackendCommand::Commit(plan)] => {
            assert_eq!(plan.len(), 1);
            assert_eq!(plan.writes[0].0, keys::CONCURRENCY);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
    assert!(app.state.settings.is_committing());

    // A second confirm while saving is ignored.
    app.update(Action::SaveSettings);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn undo_restores_committed_values() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    app.set_cursor(field_index(keys::HEADLESS));

    app.update(Action::Activate);
    assert_eq!(app.state.settings.draft().bool(keys::HEADLESS), Some(true));
    app.update(Action::UndoSettings);

    assert_eq!(app.state.settings.draft().bool(keys::HEADLESS), Some(false));
    assert!(!app.state.settings.is_dirty());
}

#[test]
fn settings_keys_do_nothing_off_the_settings_screen() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);

    app.update(Action::ResetSettings);
    app.update(Action::SelectFolder);
    assert!(!app.state.settings.is_dirty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn reset_keeps_save_path() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));

    app.update(Action::ResetSettings);

    assert!(app.state.settings.is_dirty());
    assert_eq!(
        app.state.settings.draft().text(keys::SAVE_PATH),
        Some("D:/x-spider")
    );
}

#[test]
fn threshold_is_locked_in_deep_scan_mode() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    app.set_cursor(field_index(keys::DEEP_SCAN));
    app.update(Action::Activate);
    assert_eq!(app.state.settings.draft().bool(keys::DEEP_SCAN), Some(true));

    // The row cannot normally be reached; force it to check the refusal.
    app.set_cursor(field_index(keys::STOP_THRESH));
    app.update(Action::Increase);

    assert_eq!(app.state.settings.draft().int(keys::STOP_THRESH), Some(300));
    assert_eq!(app.state.notify.toasts()[0].level, LogLevel::Warning);
    assert_eq!(app.cursor(), field_index(keys::STOP_THRESH) + 1);
}

#[test]
fn cursor_skips_threshold_in_deep_scan_mode() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    let deep_scan = field_index(keys::DEEP_SCAN);
    let threshold = field_index(keys::STOP_THRESH);
    assert_eq!(threshold, deep_scan + 1);

    app.set_cursor(deep_scan);
    app.update(Action::MoveDown);
    assert_eq!(app.cursor(), threshold);

    app.update(Action::MoveUp);
    app.update(Action::Activate);
    assert_eq!(app.state.settings.draft().bool(keys::DEEP_SCAN), Some(true));

    app.update(Action::MoveDown);
    assert_eq!(app.cursor(), threshold + 1);
    app.update(Action::MoveUp);
    assert_eq!(app.cursor(), deep_scan);

    // Turning deep scan back off makes the row reachable again.
    app.update(Action::Activate);
    app.update(Action::MoveDown);
    assert_eq!(app.cursor(), threshold);
}

#[test]
fn cursor_leaves_threshold_when_deep_scan_turns_on() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    let threshold = field_index(keys::STOP_THRESH);
    app.set_cursor(threshold);

    let mut cfg = loaded_settings();
    cfg.set(keys::DEEP_SCAN, true);
    app.handle_backend_event(BackendEvent::SettingsLoaded(Ok(cfg)));

    assert!(app.focusable(Screen::Settings, threshold - 1));
    assert!(!app.focusable(Screen::Settings, threshold));
    assert_ne!(app.cursor(), threshold);
}

#[test]
fn number_fields_are_edited_as_text() {
    let (mut app, mut rx) = test_app();
    with_settings(&mut app, &mut rx);
    app.update(Action::ShowScreen(Screen::Settings));
    app.set_cursor(field_index(keys::TIMEOUT));

    app.update(Action::Activate);
    assert_eq!(app.input_target, Some(InputTarget::EditSetting(keys::TIMEOUT)));
    assert_eq!(app.input_buffer, "60");

    app.update(Action::InputBackspace);
    app.update(Action::InputBackspace);
    type_text(&mut app, "90");
    app.update(Action::InputSubmit);
    assert_eq!(app.state.settings.draft().int(keys::TIMEOUT), Some(90));

    app.update(Action::Activate);
    app.input_buffer.clear();
    type_text(&mut app, "soon");
    app.update(Action::InputSubmit);
    assert_eq!(app.state.settings.draft().int(keys::TIMEOUT), Some(90));
    assert_eq!(app.state.notify.toasts()[0].level, LogLevel::Warning);
}

#[test]
fn folder_pick_goes_to_engine() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ShowScreen(Screen::Settings));
    app.update(Action::SelectFolder);
    assert_eq!(drain(&mut rx), vec![BackendCommand::SelectFolder]);
}

// ── Theme ───────────────────────────────────────────────────────

#[test]
fn theme_cycle_switches_palette_and_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let (mut app, _rx) = test_app();
    app.prefs_path = Some(path.clone());

    app.update(Action::CycleTheme);
    assert_eq!(app.state.theme.preference(), ThemePreference::System);
    assert_eq!(app.theme.appearance, Appearance::Dark);
    assert_eq!(
        app.state.settings.draft().text(keys::THEME),
        Some("system")
    );

    app.update(Action::CycleTheme);
    assert_eq!(app.theme.appearance, Appearance::Light);

    let saved = config_file::load_from_path(&path).unwrap();
    assert_eq!(saved.display.unwrap().theme.as_deref(), Some("light"));
}

#[test]
fn os_signal_only_matters_under_system() {
    let (mut app, _rx) = test_app();
    app.update(Action::OsAppearance(Appearance::Light));
    assert_eq!(app.theme.appearance, Appearance::Dark);

    let mut app = App::new(ThemePreference::System, Appearance::Dark);
    app.update(Action::OsAppearance(Appearance::Light));
    assert_eq!(app.theme.appearance, Appearance::Light);
}

#[test]
fn loaded_theme_setting_is_applied() {
    let (mut app, mut rx) = test_app();
    let mut cfg = loaded_settings();
    cfg.set(keys::THEME, "light");
    app.handle_backend_event(BackendEvent::SettingsLoaded(Ok(cfg)));
    drain(&mut rx);

    assert_eq!(app.theme.appearance, Appearance::Light);
    assert!(!app.state.settings.is_dirty());
}

// ── Log ─────────────────────────────────────────────────────────

#[test]
fn log_follows_until_scrolled_up() {
    let (mut app, _rx) = test_app();
    app.update(Action::ShowScreen(Screen::Log));
    for i in 0..5 {
        app.handle_backend_event(BackendEvent::Engine(EngineEvent::Log {
            message: format!("line {i}"),
            level: LogLevel::Info,
        }));
    }
    assert_eq!(app.cursor(), 4);

    app.update(Action::MoveUp);
    assert!(!app.log_follow);
    app.handle_backend_event(BackendEvent::Engine(EngineEvent::Log {
        message: "more".into(),
        level: LogLevel::Info,
    }));
    assert_eq!(app.cursor(), 3);

    app.update(Action::GoBottom);
    assert!(app.log_follow);
    assert_eq!(app.cursor(), 5);

    app.update(Action::ClearAll);
    assert_eq!(app.row_count(Screen::Log), 0);
}
