use xspider_panel_core::Appearance;

use crate::app::Screen;

/// Everything the user (or the terminal) can ask the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Tick,
    Resize(u16, u16),
    None,

    // Navigation
    MoveUp,
    MoveDown,
    GoTop,
    GoBottom,
    PageUp,
    PageDown,
    NextScreen,
    PrevScreen,
    ShowScreen(Screen),
    ClickAt(u16, u16),
    ToggleHelp,

    // Engine and account
    ToggleEngine,
    PauseAll,
    ResumeAll,
    Login,
    ExportCookies,
    Refresh,
    CycleTheme,

    // Queue and history
    StartAddTasks,
    AddMyLikes,
    AddMyBookmarks,
    /// Enter on the selected row: task control, history re-add, or edit setting.
    Activate,
    DeleteSelected,
    ClearAll,

    // Settings
    Increase,
    Decrease,
    SaveSettings,
    UndoSettings,
    ResetSettings,
    SelectFolder,

    // Text input
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,

    // Modal (alert or confirmation)
    ModalYes,
    ModalNo,

    /// OS appearance signal from the watcher task.
    OsAppearance(Appearance),
}
