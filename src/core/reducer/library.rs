use super::{CoreState, UiAction};
use crate::app::{Focus, Library, LoadState};
use crate::core::effects::CoreEffects;
use crate::core::infra::RequestKey;
use crate::error::MessageError;
use crate::feed::{NetCommand, NetEvent};
use crate::messages::app::AppCommand;

const PAGE_SIZE: usize = 10;

pub(super) fn handle_ui(
    cmd: &AppCommand,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> UiAction {
    let app = &mut state.app;
    match cmd {
        AppCommand::Bootstrap => {
            let worker_req = state.issue(RequestKey::Worker);
            effects.send_net_hi_warn(
                NetCommand::Init { req_id: worker_req },
                "NetActor 通道已关闭：Init 发送失败",
            );
            request_manifest(state, effects, false);
        }
        AppCommand::Reload => request_manifest(state, effects, true),
        AppCommand::SearchInputChar { c } => {
            let mut query = app.library.query().to_owned();
            query.push(*c);
            set_query(state, query, effects);
        }
        AppCommand::SearchInputBackspace => {
            let mut query = app.library.query().to_owned();
            if query.pop().is_none() {
                return UiAction::Handled;
            }
            set_query(state, query, effects);
        }
        AppCommand::SearchClear => set_query(state, String::new(), effects),
        AppCommand::MoveUp => move_selection(state, -1, effects),
        AppCommand::MoveDown => move_selection(state, 1, effects),
        AppCommand::PageUp => move_selection(state, -(PAGE_SIZE as isize), effects),
        AppCommand::PageDown => move_selection(state, PAGE_SIZE as isize, effects),
        AppCommand::CategoryMoveUp => {
            app.category_selected = app.category_selected.saturating_sub(1);
            effects.emit_state(app);
        }
        AppCommand::CategoryMoveDown => {
            let last = app.library.categories().len().saturating_sub(1);
            app.category_selected = (app.category_selected + 1).min(last);
            effects.emit_state(app);
        }
        AppCommand::CategoryToggle => {
            let Some(category) = app
                .library
                .categories()
                .into_iter()
                .nth(app.category_selected)
            else {
                return UiAction::Handled;
            };
            let enabled = app.library.toggle_category(&category.name);
            tracing::debug!(category = %category.name, enabled, "切换分类");
            after_filter_change(state, effects);
        }
        AppCommand::CategoryAll => {
            app.library.select_all();
            after_filter_change(state, effects);
        }
        AppCommand::CategoryNone => {
            app.library.select_none();
            after_filter_change(state, effects);
        }
        _ => return UiAction::NotHandled,
    }
    UiAction::Handled
}

fn request_manifest(state: &mut CoreState, effects: &mut CoreEffects, force_refresh: bool) {
    let req_id = state.issue(RequestKey::Manifest);
    state.app.load_state = LoadState::Loading;
    state.app.status = "Loading tracks...".to_owned();
    tracing::info!(req_id, force_refresh, "请求清单");
    effects.send_net_hi_warn(
        NetCommand::LoadManifest {
            req_id,
            force_refresh,
        },
        "NetActor 通道已关闭：LoadManifest 发送失败",
    );
    effects.emit_state(&state.app);
}

fn set_query(state: &mut CoreState, query: String, effects: &mut CoreEffects) {
    state.app.library.set_query(query);
    state.app.selected_row = 0;
    after_filter_change(state, effects);
}

fn after_filter_change(state: &mut CoreState, effects: &mut CoreEffects) {
    state.app.clamp_selection();
    effects.emit_state(&state.app);
}

fn move_selection(state: &mut CoreState, delta: isize, effects: &mut CoreEffects) {
    let app = &mut state.app;
    let visible = app.library.visible().len();
    if visible == 0 {
        return;
    }
    app.selected_row = app
        .selected_row
        .saturating_add_signed(delta)
        .min(visible - 1);
    // 焦点随键盘移动回到曲目列表
    app.focus = Focus::Tracks;
    effects.emit_state(app);
}

pub(super) fn handle_net_event(
    evt: &NetEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> bool {
    match evt {
        NetEvent::WorkerReady {
            req_id,
            controlling,
            error,
        } => {
            if !state.request_tracker.accept(&RequestKey::Worker, *req_id) {
                return false;
            }
            state.app.offline_ready = *controlling;
            if let Some(e) = error {
                effects.toast(format!("Offline support unavailable: {e}"));
            }
            effects.emit_state(&state.app);
            true
        }
        NetEvent::Manifest {
            req_id,
            tracks,
            cached,
        } => {
            if !state.request_tracker.accept(&RequestKey::Manifest, *req_id) {
                return false;
            }
            let app = &mut state.app;
            let previous = std::mem::take(&mut app.library);
            let mut library = Library::new(tracks.clone());
            if state.selection_restored {
                let selected: Vec<String> = previous.selected().iter().cloned().collect();
                library.restore_selection(&selected);
            } else {
                library.restore_selection(&state.settings.selected_categories);
                state.selection_restored = true;
            }
            library.set_query(previous.query());

            app.library = library;
            app.cached = cached.clone();
            app.load_state = LoadState::Ready;
            app.status = format!("{} tracks", tracks.len());
            app.clamp_selection();
            tracing::info!(tracks = tracks.len(), cached = cached.len(), "清单已加载");
            effects.emit_state(app);
            true
        }
        NetEvent::Error {
            req_id, message, ..
        } if state.request_tracker.owns(&RequestKey::Manifest, *req_id) => {
            state.request_tracker.accept(&RequestKey::Manifest, *req_id);
            let app = &mut state.app;
            app.library = Library::default();
            app.selected_row = 0;
            app.category_selected = 0;
            app.load_state = LoadState::Failed(message.clone());
            app.status = "Failed to load tracks.".to_owned();
            effects.error(MessageError::ManifestLoad(message.clone()));
            effects.emit_state(app);
            true
        }
        NetEvent::Error {
            req_id, message, ..
        } if state.request_tracker.owns(&RequestKey::Worker, *req_id) => {
            state.request_tracker.accept(&RequestKey::Worker, *req_id);
            tracing::warn!(err = %message, "拦截层启动失败");
            true
        }
        _ => false,
    }
}
