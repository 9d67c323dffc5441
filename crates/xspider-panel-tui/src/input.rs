use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::action::Action;
use crate::app::{InputMode, Screen};

/// Map a crossterm terminal event to a panel action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::TextInput => map_key_text_input(key),
                InputMode::Modal => map_key_modal(key),
            }
        }
        Event::Mouse(mouse) if *input_mode == InputMode::Normal => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        MouseEventKind::Down(MouseButton::Left) => Action::ClickAt(mouse.column, mouse.row),
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Char('d') if ctrl => Action::PageDown,
        KeyCode::Char('u') if ctrl => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Tab => Action::NextScreen,
        KeyCode::BackTab => Action::PrevScreen,
        KeyCode::Char('1') => Action::ShowScreen(Screen::Queue),
        KeyCode::Char('2') => Action::ShowScreen(Screen::History),
        KeyCode::Char('3') => Action::ShowScreen(Screen::Finished),
        KeyCode::Char('4') => Action::ShowScreen(Screen::Settings),
        KeyCode::Char('5') => Action::ShowScreen(Screen::Log),
        KeyCode::Char('?') => Action::ToggleHelp,

        KeyCode::Char('s') if ctrl => Action::SaveSettings,
        KeyCode::Char('s') => Action::ToggleEngine,
        KeyCode::Char('P') => Action::PauseAll,
        KeyCode::Char('R') => Action::ResumeAll,
        KeyCode::Char('L') => Action::Login,
        KeyCode::Char('E') => Action::ExportCookies,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('t') => Action::CycleTheme,

        KeyCode::Char('a') => Action::StartAddTasks,
        KeyCode::Char('l') => Action::AddMyLikes,
        KeyCode::Char('b') => Action::AddMyBookmarks,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('x') | KeyCode::Delete => Action::DeleteSelected,
        KeyCode::Char('C') => Action::ClearAll,

        KeyCode::Right | KeyCode::Char('+') => Action::Increase,
        KeyCode::Left | KeyCode::Char('-') => Action::Decrease,
        KeyCode::Char('w') => Action::SaveSettings,
        KeyCode::Char('u') => Action::UndoSettings,
        KeyCode::Char('D') => Action::ResetSettings,
        KeyCode::Char('o') => Action::SelectFolder,
        _ => Action::None,
    }
}

fn map_key_text_input(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::InputCancel,
        KeyCode::Enter => Action::InputSubmit,
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Char(c) => Action::InputChar(c),
        _ => Action::None,
    }
}

fn map_key_modal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Action::ModalYes,
        KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => Action::ModalNo,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        let evt = key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [InputMode::Normal, InputMode::TextInput, InputMode::Modal] {
            assert_eq!(map_event(&evt, &mode), Action::Quit);
        }
    }

    #[test]
    fn letters_are_text_while_typing() {
        let evt = key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(map_event(&evt, &InputMode::Normal), Action::ToggleEngine);
        assert_eq!(map_event(&evt, &InputMode::TextInput), Action::InputChar('s'));
    }

    #[test]
    fn ctrl_s_saves_settings() {
        let evt = key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(map_event(&evt, &InputMode::Normal), Action::SaveSettings);
    }

    #[test]
    fn modal_only_answers_yes_or_no() {
        assert_eq!(
            map_event(&key(KeyCode::Enter, KeyModifiers::NONE), &InputMode::Modal),
            Action::ModalYes
        );
        assert_eq!(
            map_event(&key(KeyCode::Esc, KeyModifiers::NONE), &InputMode::Modal),
            Action::ModalNo
        );
        assert_eq!(
            map_event(&key(KeyCode::Char('x'), KeyModifiers::NONE), &InputMode::Modal),
            Action::None
        );
    }
}
