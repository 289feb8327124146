use super::{CoreState, UiAction};
use crate::app::Focus;
use crate::core::effects::CoreEffects;
use crate::messages::app::AppCommand;

pub(super) fn handle_ui(
    cmd: &AppCommand,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> UiAction {
    match cmd {
        AppCommand::FocusNext => {
            state.app.focus = next_focus(state.app.focus);
            effects.emit_state(&state.app);
            UiAction::Handled
        }
        AppCommand::Quit => UiAction::Quit,
        _ => UiAction::NotHandled,
    }
}

fn next_focus(focus: Focus) -> Focus {
    match focus {
        Focus::Tracks => Focus::Categories,
        Focus::Categories => Focus::Tracks,
    }
}
