use super::{CoreState, PendingOp, UiAction};
use crate::app::DownloadLabel;
use crate::audio_worker::AudioCommand;
use crate::core::effects::CoreEffects;
use crate::error::MessageError;
use crate::feed::{NetCommand, NetEvent};
use crate::messages::app::AppCommand;
use crate::offline::normalize_key;

pub(super) fn handle_ui(
    cmd: &AppCommand,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> UiAction {
    if !matches!(cmd, AppCommand::DownloadSelected) {
        return UiAction::NotHandled;
    }
    let Some(track) = state
        .app
        .selected_index()
        .and_then(|i| state.app.library.track(i))
        .cloned()
    else {
        return UiAction::Handled;
    };

    match state.app.download_label(&track.media_url) {
        // 下载进行中，按钮处于禁用状态
        DownloadLabel::Downloading => {
            tracing::debug!(track_id = %track.id, "下载进行中，忽略重复点击");
        }
        DownloadLabel::PlayOffline => {
            state.app.now_playing_id = Some(track.id.clone());
            state.app.play_status = "Loading...".to_owned();
            effects.send_audio_warn(
                AudioCommand::Play {
                    url: track.media_url.clone(),
                    title: track.title.clone(),
                },
                "AudioWorker 通道已关闭：Play 发送失败",
            );
            effects.emit_state(&state.app);
        }
        DownloadLabel::Download => {
            let url = track.media_url.clone();
            state
                .app
                .downloading
                .insert(normalize_key(&url).to_owned());
            let req_id = state.issue_op(PendingOp::Persist {
                url: url.clone(),
                title: track.title.clone(),
            });
            tracing::info!(req_id, track_id = %track.id, url = %url, "开始离线下载");
            effects.send_net_lo_warn(
                NetCommand::Persist {
                    req_id,
                    track_id: track.id,
                    url,
                },
                "NetActor 通道已关闭：Persist 发送失败",
            );
            effects.emit_state(&state.app);
        }
    }
    UiAction::Handled
}

pub(super) fn handle_net_event(
    evt: &NetEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> bool {
    match evt {
        NetEvent::Persisted {
            req_id, url, path, ..
        } => {
            let Some(PendingOp::Persist { title, .. }) = state.pending.remove(req_id) else {
                return false;
            };
            let key = normalize_key(url).to_owned();
            state.app.downloading.remove(&key);
            state.app.cached.insert(key);
            tracing::info!(url = %url, path = %path.display(), "离线下载完成");
            effects.toast(format!("Saved for offline: {title}"));
            effects.emit_state(&state.app);
            true
        }
        NetEvent::CacheStatus {
            req_id,
            url,
            cached,
        } => {
            if state.pending.remove(req_id).is_none() {
                return false;
            }
            let key = normalize_key(url).to_owned();
            if *cached {
                state.app.cached.insert(key);
            } else {
                state.app.cached.remove(&key);
            }
            effects.emit_state(&state.app);
            true
        }
        NetEvent::Error {
            req_id, message, ..
        } if matches!(state.pending.get(req_id), Some(PendingOp::Persist { .. })) => {
            let Some(PendingOp::Persist { url, title }) = state.pending.remove(req_id) else {
                return false;
            };
            state.app.downloading.remove(normalize_key(&url));
            effects.error(MessageError::Download {
                title,
                detail: message.clone(),
            });
            effects.emit_state(&state.app);
            true
        }
        _ => false,
    }
}
