use super::{CoreState, PendingOp, UiAction};
use crate::audio_worker::AudioCommand;
use crate::core::effects::CoreEffects;
use crate::error::MessageError;
use crate::feed::{NetCommand, NetEvent};
use crate::messages::app::AppCommand;

pub(super) fn handle_ui(
    cmd: &AppCommand,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> UiAction {
    let resolve = match cmd {
        AppCommand::ResolveSelected => true,
        AppCommand::OpenSourceSelected => false,
        _ => return UiAction::NotHandled,
    };
    let Some(track) = state
        .app
        .selected_index()
        .and_then(|i| state.app.library.track(i))
        .cloned()
    else {
        return UiAction::Handled;
    };
    let source_url = state.cfg.source_url(&track);

    if !resolve {
        tracing::info!(url = %source_url, "打开原始页面");
        effects.open_browser(source_url);
        return UiAction::Handled;
    }

    if !state.app.resolving.insert(track.id.clone()) {
        tracing::debug!(track_id = %track.id, "解析进行中，忽略重复点击");
        return UiAction::Handled;
    }
    let req_id = state.issue_op(PendingOp::Resolve {
        track_id: track.id.clone(),
        title: track.title.clone(),
    });
    tracing::info!(req_id, track_id = %track.id, url = %source_url, "开始解析源链接");
    effects.send_net_lo_warn(
        NetCommand::Resolve {
            req_id,
            track_id: track.id,
            source_url,
        },
        "NetActor 通道已关闭：Resolve 发送失败",
    );
    effects.emit_state(&state.app);
    UiAction::Handled
}

pub(super) fn handle_net_event(
    evt: &NetEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> bool {
    match evt {
        NetEvent::Resolved {
            req_id,
            track_id,
            media_url,
        } => {
            let Some(PendingOp::Resolve { title, .. }) = state.pending.remove(req_id) else {
                return false;
            };
            state.app.resolving.remove(track_id);

            // 解析结果直接覆盖曲目的媒体地址
            if let Some(track) = state
                .app
                .library
                .find(track_id)
                .and_then(|i| state.app.library.track_mut(i))
            {
                tracing::info!(track_id = %track_id, old = %track.media_url, new = %media_url, "媒体地址已更新");
                track.media_url = media_url.clone();
            }

            state.app.now_playing_id = Some(track_id.clone());
            state.app.play_status = "Loading...".to_owned();
            effects.send_audio_warn(
                AudioCommand::Play {
                    url: media_url.clone(),
                    title,
                },
                "AudioWorker 通道已关闭：Play 发送失败",
            );
            effects.emit_state(&state.app);
            true
        }
        NetEvent::Error {
            req_id,
            message,
            not_found,
        } if matches!(state.pending.get(req_id), Some(PendingOp::Resolve { .. })) => {
            let Some(PendingOp::Resolve { track_id, title }) = state.pending.remove(req_id) else {
                return false;
            };
            state.app.resolving.remove(&track_id);
            let err = if *not_found {
                MessageError::ResolveNotFound { title }
            } else {
                MessageError::ResolveFetch {
                    title,
                    detail: message.clone(),
                }
            };
            effects.error(err);
            effects.emit_state(&state.app);
            true
        }
        NetEvent::Error { req_id, .. }
            if matches!(state.pending.get(req_id), Some(PendingOp::CheckCached)) =>
        {
            state.pending.remove(req_id);
            true
        }
        _ => false,
    }
}
