use crate::app::{AppSnapshot, Focus};
use crate::messages::app::AppCommand;
use crossterm::event::{MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

/// 滚轮映射成上下移动
pub(super) fn map_mouse(app: &AppSnapshot, mouse: MouseEvent) -> Option<AppCommand> {
    let in_categories = matches!(app.focus, Focus::Categories);
    match (mouse.kind, in_categories) {
        (MouseEventKind::ScrollUp, false) => Some(AppCommand::MoveUp),
        (MouseEventKind::ScrollDown, false) => Some(AppCommand::MoveDown),
        (MouseEventKind::ScrollUp, true) => Some(AppCommand::CategoryMoveUp),
        (MouseEventKind::ScrollDown, true) => Some(AppCommand::CategoryMoveDown),
        _ => None,
    }
}

pub(super) async fn handle_mouse(
    app: &AppSnapshot,
    mouse: MouseEvent,
    tx: &mpsc::Sender<AppCommand>,
) {
    if let Some(cmd) = map_mouse(app, mouse) {
        let _ = tx.send(cmd).await;
    }
}
