use super::{CoreState, PendingOp, UiAction};
use crate::audio_worker::{AudioCommand, AudioEvent};
use crate::core::effects::CoreEffects;
use crate::error::MessageError;
use crate::feed::NetCommand;
use crate::messages::app::AppCommand;

const VOLUME_STEP: f32 = 0.1;
const VOLUME_MAX: f32 = 2.0;

pub(super) fn handle_ui(
    cmd: &AppCommand,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> UiAction {
    let app = &mut state.app;
    match cmd {
        AppCommand::PlaySelected => {
            let Some(track) = app
                .selected_index()
                .and_then(|i| app.library.track(i))
                .cloned()
            else {
                return UiAction::Handled;
            };
            tracing::info!(track_id = %track.id, url = %track.media_url, "播放选中曲目");
            app.now_playing_id = Some(track.id.clone());
            app.play_status = "Loading...".to_owned();
            effects.send_audio_warn(
                AudioCommand::Play {
                    url: track.media_url,
                    title: track.title,
                },
                "AudioWorker 通道已关闭：Play 发送失败",
            );
            effects.emit_state(app);
        }
        AppCommand::TogglePause => {
            effects.send_audio_warn(
                AudioCommand::TogglePause,
                "AudioWorker 通道已关闭：TogglePause 发送失败",
            );
        }
        AppCommand::Stop => {
            effects.send_audio_warn(AudioCommand::Stop, "AudioWorker 通道已关闭：Stop 发送失败");
        }
        AppCommand::VolumeUp | AppCommand::VolumeDown => {
            let delta = if matches!(cmd, AppCommand::VolumeUp) {
                VOLUME_STEP
            } else {
                -VOLUME_STEP
            };
            // 按 0.1 取整，避免浮点累加误差
            app.volume = ((app.volume + delta) * 10.0).round().clamp(0.0, VOLUME_MAX * 10.0) / 10.0;
            effects.send_audio(AudioCommand::SetVolume(app.volume));
            effects.emit_state(app);
        }
        _ => return UiAction::NotHandled,
    }
    UiAction::Handled
}

/// 播放开始时音频已经落盘，刷新当前曲目的下载按钮
fn refresh_playing_cache_status(state: &mut CoreState, effects: &mut CoreEffects) {
    let Some(url) = state
        .app
        .now_playing_id
        .as_deref()
        .and_then(|id| state.app.library.find(id))
        .and_then(|i| state.app.library.track(i))
        .map(|t| t.media_url.clone())
        .filter(|url| !state.app.is_cached(url))
    else {
        return;
    };
    let req_id = state.issue_op(PendingOp::CheckCached);
    effects.send_net_lo_warn(
        NetCommand::CheckCached { req_id, url },
        "NetActor 通道已关闭：CheckCached 发送失败",
    );
}

pub(super) fn handle_audio_event(evt: AudioEvent, state: &mut CoreState, effects: &mut CoreEffects) {
    if matches!(evt, AudioEvent::NowPlaying { .. }) {
        refresh_playing_cache_status(state, effects);
    }
    let app = &mut state.app;
    match evt {
        AudioEvent::NowPlaying {
            play_id,
            title,
            duration_ms,
        } => {
            tracing::info!(play_id, title = %title, ?duration_ms, "正在播放");
            app.play_id = play_id;
            app.now_playing = Some(title);
            app.play_total_ms = duration_ms;
            app.paused = false;
            app.play_status = "Playing".to_owned();
        }
        AudioEvent::Paused(paused) => {
            app.paused = paused;
            app.play_status = if paused { "Paused" } else { "Playing" }.to_owned();
        }
        AudioEvent::Stopped => {
            app.now_playing = None;
            app.now_playing_id = None;
            app.play_total_ms = None;
            app.paused = false;
            app.play_status = "Stopped".to_owned();
        }
        AudioEvent::Ended { play_id } => {
            if play_id != app.play_id {
                tracing::debug!(play_id, current = app.play_id, "忽略旧音轨的结束事件");
                return;
            }
            app.now_playing_id = None;
            app.paused = false;
            app.play_status = "Finished".to_owned();
        }
        AudioEvent::Error(message) => {
            tracing::warn!(err = %message, "播放失败");
            app.now_playing_id = None;
            app.play_status = "Playback failed".to_owned();
            effects.error(MessageError::Playback(message));
        }
    }
    effects.emit_state(app);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{audio_commands, loaded_state, net_commands, state, track};
    use super::*;
    use crate::core::effects::CoreEffect;
    use crate::offline::normalize_key;

    fn now_playing(state: &mut CoreState) -> CoreEffects {
        let mut effects = CoreEffects::default();
        handle_audio_event(
            AudioEvent::NowPlaying {
                play_id: 1,
                title: "Hello World".to_owned(),
                duration_ms: None,
            },
            state,
            &mut effects,
        );
        effects
    }

    #[test]
    fn playback_start_rechecks_cache_for_playing_track() {
        let mut state = loaded_state(vec![track("abc", "funny", "Hello World")]);
        let mut effects = CoreEffects::default();
        handle_ui(&AppCommand::PlaySelected, &mut state, &mut effects);
        // 发出播放时不查询缓存
        assert!(net_commands(&effects).is_empty());

        let effects = now_playing(&mut state);
        assert!(matches!(
            effects.actions[..],
            [CoreEffect::SendNetLo { cmd: NetCommand::CheckCached { ref url, .. }, .. }, ..]
                if url == "https://gwasi.com/audio/abc.m4a"
        ));
    }

    #[test]
    fn playback_start_skips_check_when_already_cached() {
        let mut state = loaded_state(vec![track("abc", "funny", "Hello World")]);
        state
            .app
            .cached
            .insert(normalize_key("https://gwasi.com/audio/abc.m4a").to_owned());
        let mut effects = CoreEffects::default();
        handle_ui(&AppCommand::PlaySelected, &mut state, &mut effects);

        assert!(net_commands(&now_playing(&mut state)).is_empty());
    }

    #[test]
    fn play_selected_sends_media_url() {
        let mut state = loaded_state(vec![track("abc", "funny", "Hello World")]);
        let mut effects = CoreEffects::default();
        handle_ui(&AppCommand::PlaySelected, &mut state, &mut effects);
        assert!(matches!(
            audio_commands(&effects)[..],
            [AudioCommand::Play { url, title }]
                if url == "https://gwasi.com/audio/abc.m4a" && title == "Hello World"
        ));
        assert_eq!(state.app.now_playing_id.as_deref(), Some("abc"));
    }

    #[test]
    fn play_with_empty_list_does_nothing() {
        let mut state = state();
        let mut effects = CoreEffects::default();
        handle_ui(&AppCommand::PlaySelected, &mut state, &mut effects);
        assert!(audio_commands(&effects).is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut state = state();
        let mut effects = CoreEffects::default();
        for _ in 0..30 {
            handle_ui(&AppCommand::VolumeUp, &mut state, &mut effects);
        }
        assert_eq!(state.app.volume, 2.0);
        for _ in 0..30 {
            handle_ui(&AppCommand::VolumeDown, &mut state, &mut effects);
        }
        assert_eq!(state.app.volume, 0.0);
    }

    #[test]
    fn stale_end_event_is_ignored() {
        let mut state = state();
        let mut effects = CoreEffects::default();
        handle_audio_event(
            AudioEvent::NowPlaying {
                play_id: 2,
                title: "Hello World".to_owned(),
                duration_ms: Some(83_000),
            },
            &mut state,
            &mut effects,
        );
        handle_audio_event(AudioEvent::Ended { play_id: 1 }, &mut state, &mut effects);
        assert_eq!(state.app.play_status, "Playing");

        handle_audio_event(AudioEvent::Ended { play_id: 2 }, &mut state, &mut effects);
        assert_eq!(state.app.play_status, "Finished");
    }
}
