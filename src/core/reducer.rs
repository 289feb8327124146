use crate::app::App;
use crate::audio_worker::{AudioBackend, AudioCommand, AudioEvent};
use crate::error::AppError;
use crate::feed::{FeedClient, FeedConfig, NetEvent};
use crate::messages::app::{AppCommand, AppEvent};
use crate::settings::{self as app_settings, AppSettings};

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::core::effects::{CoreDispatch, CoreEffects, run_effects};
use crate::core::infra::{RequestKey, RequestTracker};
use crate::core::utils::next_id;

mod library;
mod offline;
mod player;
mod resolve;
mod ui;

enum CoreMsg {
    Ui(AppCommand),
    Net(NetEvent),
    Audio(AudioEvent),
}

/// 按曲目发起、需要在失败时定位到曲目的请求
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingOp {
    Persist { url: String, title: String },
    Resolve { track_id: String, title: String },
    CheckCached,
}

struct CoreState {
    app: App,
    req_id: u64,
    request_tracker: RequestTracker<RequestKey>,
    pending: HashMap<u64, PendingOp>,
    settings: AppSettings,
    cfg: FeedConfig,
    /// 首次加载清单时恢复一次上次的分类勾选
    selection_restored: bool,
}

enum UiAction {
    Handled,
    NotHandled,
    Quit,
}

impl CoreState {
    fn new(cfg: FeedConfig, settings: AppSettings) -> Self {
        let app = App {
            volume: settings.volume,
            ..App::default()
        };
        Self {
            app,
            req_id: 1,
            request_tracker: RequestTracker::new(),
            pending: HashMap::new(),
            settings,
            cfg,
            selection_restored: false,
        }
    }

    fn issue(&mut self, key: RequestKey) -> u64 {
        let req_id = &mut self.req_id;
        self.request_tracker.issue(key, || next_id(req_id))
    }

    fn issue_op(&mut self, op: PendingOp) -> u64 {
        let id = next_id(&mut self.req_id);
        self.pending.insert(id, op);
        id
    }

    /// 退出前把当前音量与分类勾选写回设置
    fn sync_settings(&mut self) {
        self.settings.volume = self.app.volume;
        if !self.app.library.is_empty() {
            self.settings.selected_categories =
                self.app.library.selected().iter().cloned().collect();
        }
    }
}

async fn reduce(msg: CoreMsg, state: &mut CoreState, effects: &mut CoreEffects) -> bool {
    match msg {
        CoreMsg::Ui(cmd) => {
            match ui::handle_ui(&cmd, state, effects) {
                UiAction::Quit => return true,
                UiAction::Handled => return false,
                UiAction::NotHandled => {}
            }
            if matches!(
                library::handle_ui(&cmd, state, effects),
                UiAction::Handled
            ) {
                return false;
            }
            if matches!(
                offline::handle_ui(&cmd, state, effects),
                UiAction::Handled
            ) {
                return false;
            }
            if matches!(
                resolve::handle_ui(&cmd, state, effects),
                UiAction::Handled
            ) {
                return false;
            }
            if matches!(
                player::handle_ui(&cmd, state, effects),
                UiAction::Handled
            ) {
                return false;
            }
            tracing::debug!(?cmd, "未处理的命令");
        }
        CoreMsg::Net(evt) => {
            if library::handle_net_event(&evt, state, effects) {
                return false;
            }
            if offline::handle_net_event(&evt, state, effects) {
                return false;
            }
            if resolve::handle_net_event(&evt, state, effects) {
                return false;
            }
            tracing::debug!(?evt, "丢弃过期的网络事件");
        }
        CoreMsg::Audio(evt) => {
            player::handle_audio_event(evt, state, effects);
        }
    }

    false
}

pub fn spawn_app_actor(
    mut cfg: FeedConfig,
    audio_backend: AudioBackend,
) -> Result<(mpsc::Sender<AppCommand>, mpsc::Receiver<AppEvent>), AppError> {
    let (tx_cmd, mut rx_cmd) = mpsc::channel::<AppCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<AppEvent>(64);

    let settings = app_settings::load_settings(&cfg.data_dir);
    cfg.http_timeout_secs = settings.http_timeout_secs;
    cfg.http_connect_timeout_secs = settings.http_connect_timeout_secs;

    let client = FeedClient::new(cfg.clone())?;
    let (tx_net_hi, tx_net_lo, mut rx_net) = crate::feed::spawn_net_actor(client.clone());
    let (tx_audio, mut rx_audio_evt) = crate::audio_worker::spawn_audio_worker(audio_backend, client);

    tokio::spawn(async move {
        let data_dir = cfg.data_dir.clone();
        let mut state = CoreState::new(cfg, settings);

        let _ = tx_audio
            .send(AudioCommand::SetVolume(state.app.volume))
            .await;

        let dispatch = CoreDispatch {
            tx_net_hi: &tx_net_hi,
            tx_net_lo: &tx_net_lo,
            tx_audio: &tx_audio,
            tx_evt: &tx_evt,
        };

        loop {
            let msg = tokio::select! {
                Some(cmd) = rx_cmd.recv() => CoreMsg::Ui(cmd),
                Some(evt) = rx_net.recv() => CoreMsg::Net(evt),
                Some(evt) = rx_audio_evt.recv() => CoreMsg::Audio(evt),
                else => break,
            };

            let mut effects = CoreEffects::default();
            let should_quit = reduce(msg, &mut state, &mut effects).await;
            run_effects(effects, &dispatch).await;
            if should_quit {
                state.sync_settings();
                match app_settings::save_settings(&data_dir, &state.settings) {
                    Ok(()) => tracing::info!("设置已保存"),
                    Err(e) => tracing::error!(err = %e, "保存设置失败"),
                }
                break;
            }
        }
    });

    Ok((tx_cmd, rx_evt))
}
