use crate::app::{AppSnapshot, Focus};
use crate::messages::app::AppCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// 返回 true 表示退出事件循环
pub(super) async fn handle_key(
    app: &AppSnapshot,
    key: KeyEvent,
    tx: &mpsc::Sender<AppCommand>,
) -> bool {
    // 部分终端会同时上报按下与松开，只处理按下/重复
    if matches!(key.kind, KeyEventKind::Release) {
        return false;
    }

    let Some(cmd) = map_key(app, key) else {
        return false;
    };
    let quit = matches!(cmd, AppCommand::Quit);
    tracing::debug!(?cmd, "按键映射");
    let _ = tx.send(cmd).await;
    quit
}

/// 按键到命令的纯映射，普通字符进入搜索框
pub(super) fn map_key(app: &AppSnapshot, key: KeyEvent) -> Option<AppCommand> {
    let in_categories = matches!(app.focus, Focus::Categories);

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        return match c.to_ascii_lowercase() {
            'q' | 'c' => Some(AppCommand::Quit),
            'd' => Some(AppCommand::DownloadSelected),
            'o' => Some(AppCommand::OpenSourceSelected),
            'r' => Some(AppCommand::ResolveSelected),
            'l' => Some(AppCommand::Reload),
            'p' => Some(AppCommand::TogglePause),
            's' => Some(AppCommand::Stop),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => Some(AppCommand::FocusNext),
        KeyCode::Esc => Some(AppCommand::SearchClear),
        KeyCode::Backspace => Some(AppCommand::SearchInputBackspace),
        KeyCode::Enter => Some(AppCommand::PlaySelected),
        KeyCode::Up if in_categories => Some(AppCommand::CategoryMoveUp),
        KeyCode::Down if in_categories => Some(AppCommand::CategoryMoveDown),
        KeyCode::Up => Some(AppCommand::MoveUp),
        KeyCode::Down => Some(AppCommand::MoveDown),
        KeyCode::PageUp => Some(AppCommand::PageUp),
        KeyCode::PageDown => Some(AppCommand::PageDown),
        KeyCode::Char(c) if in_categories => match c {
            ' ' => Some(AppCommand::CategoryToggle),
            'a' => Some(AppCommand::CategoryAll),
            'n' => Some(AppCommand::CategoryNone),
            '+' | '=' => Some(AppCommand::VolumeUp),
            '-' => Some(AppCommand::VolumeDown),
            _ => Some(AppCommand::SearchInputChar { c }),
        },
        KeyCode::Char(c) => Some(AppCommand::SearchInputChar { c }),
        _ => None,
    }
}
