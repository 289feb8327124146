use crate::app::AppSnapshot;
use crate::error::MessageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Bootstrap,
    Reload,
    SearchInputChar { c: char },
    SearchInputBackspace,
    SearchClear,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    CategoryMoveUp,
    CategoryMoveDown,
    CategoryToggle,
    CategoryAll,
    CategoryNone,
    FocusNext,
    PlaySelected,
    DownloadSelected,
    OpenSourceSelected,
    ResolveSelected,
    TogglePause,
    Stop,
    VolumeUp,
    VolumeDown,
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    State(Box<AppSnapshot>),
    Toast(String),
    Error(MessageError),
}
