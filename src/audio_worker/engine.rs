use rodio::OutputStreamBuilder;
use std::path::{Path, PathBuf};
use tokio::runtime::Handle;
use tokio::select;
use tokio::sync::mpsc;

use super::messages::{AudioCommand, AudioEvent};
use super::player::PlayerState;
use crate::feed::FeedClient;

struct PendingPlay {
    token: u64,
    title: String,
    url: String,
}

/// 下载完成回执：token 用于丢弃被新请求取代的结果
struct FetchDone {
    token: u64,
    result: Result<PathBuf, String>,
}

struct AudioEngine {
    tx_evt: mpsc::Sender<AudioEvent>,
    rx_cmd: mpsc::Receiver<AudioCommand>,
    tx_fetch: mpsc::Sender<FetchDone>,
    rx_fetch: mpsc::Receiver<FetchDone>,
    client: FeedClient,
    net: Handle,
    state: PlayerState,
    pending_play: Option<PendingPlay>,
    next_token: u64,
}

impl AudioEngine {
    fn new(
        tx_evt: mpsc::Sender<AudioEvent>,
        rx_cmd: mpsc::Receiver<AudioCommand>,
        client: FeedClient,
        net: Handle,
        state: PlayerState,
    ) -> Self {
        let (tx_fetch, rx_fetch) = mpsc::channel(8);
        Self {
            tx_evt,
            rx_cmd,
            tx_fetch,
            rx_fetch,
            client,
            net,
            state,
            pending_play: None,
            next_token: 1,
        }
    }

    async fn run(mut self) {
        loop {
            select! {
                biased;
                Some(done) = self.rx_fetch.recv() => {
                    self.handle_fetch_done(done).await;
                }
                maybe_cmd = self.rx_cmd.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        break;
                    };
                    self.handle_audio_command(cmd).await;
                }
            }
        }
        tracing::debug!("AudioEngine 退出");
    }

    async fn handle_fetch_done(&mut self, done: FetchDone) {
        let Some(p) = self.pending_play.take_if(|p| p.token == done.token) else {
            tracing::debug!(token = done.token, "丢弃过期的音频下载结果");
            return;
        };
        match done.result {
            Ok(path) => {
                tracing::info!(url = %p.url, path = %path.display(), "音频已就绪");
                self.start_playback(&path, p.title).await;
            }
            Err(e) => {
                tracing::warn!(url = %p.url, err = %e, "音频获取失败");
                let _ = self.tx_evt.send(AudioEvent::Error(e)).await;
            }
        }
    }

    async fn handle_audio_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Play { url, title } => {
                tracing::info!(url = %url, title = %title, "开始播放请求");
                if let Some(old) = self.pending_play.take() {
                    tracing::debug!(old_token = old.token, url = %old.url, "取消旧播放请求");
                }

                let token = self.next_token;
                self.next_token = self.next_token.wrapping_add(1).max(1);
                self.pending_play = Some(PendingPlay {
                    token,
                    title,
                    url: url.clone(),
                });

                // HTTP 客户端属于主运行时，下载也在主运行时上执行
                let client = self.client.clone();
                let tx_fetch = self.tx_fetch.clone();
                self.net.spawn(async move {
                    let result = client.fetch_audio(&url).await.map_err(|e| e.to_string());
                    let _ = tx_fetch.send(FetchDone { token, result }).await;
                });
            }
            AudioCommand::TogglePause => {
                let Some(sink) = self.state.current_sink() else {
                    tracing::debug!("没有正在播放的音轨，忽略暂停");
                    return;
                };
                let next_paused = !self.state.paused();
                self.state.set_paused(next_paused);
                if next_paused {
                    sink.pause();
                } else {
                    sink.play();
                }
                let _ = self.tx_evt.send(AudioEvent::Paused(next_paused)).await;
            }
            AudioCommand::Stop => {
                self.pending_play = None;
                self.state.stop();
                let _ = self.tx_evt.send(AudioEvent::Stopped).await;
            }
            AudioCommand::SetVolume(v) => {
                self.state.set_volume(v.clamp(0.0, 2.0));
                if let Some(sink) = self.state.current_sink() {
                    sink.set_volume(self.state.volume());
                }
            }
        }
    }

    async fn start_playback(&mut self, path: &Path, title: String) {
        match self.state.start(&self.tx_evt, path, &title) {
            Ok(duration_ms) => {
                tracing::debug!(path = %path.display(), play_id = self.state.play_id(), "start playback");
                let _ = self
                    .tx_evt
                    .send(AudioEvent::NowPlaying {
                        play_id: self.state.play_id(),
                        title,
                        duration_ms,
                    })
                    .await;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), err = %e, "播放失败");
                let _ = self.tx_evt.send(AudioEvent::Error(e.to_string())).await;
            }
        }
    }
}

pub(super) fn spawn(
    rx_cmd: mpsc::Receiver<AudioCommand>,
    tx_evt: mpsc::Sender<AudioEvent>,
    client: FeedClient,
) {
    let net = Handle::current();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(err = %e, "初始化音频线程运行时失败");
                let _ = tx_evt.blocking_send(AudioEvent::Error(format!("初始化音频线程失败: {e}")));
                return;
            }
        };
        let local = tokio::task::LocalSet::new();
        local.block_on(&rt, async move {
            let stream = match OutputStreamBuilder::open_default_stream() {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(err = %e, "初始化音频输出失败");
                    let _ = tx_evt
                        .send(AudioEvent::Error(format!("初始化音频输出失败: {e}")))
                        .await;
                    return;
                }
            };
            let mixer = stream.mixer().clone();
            let state = PlayerState::new(mixer, stream);

            tracing::info!("AudioWorker 已启动");

            let engine = AudioEngine::new(tx_evt, rx_cmd, client, net, state);
            engine.run().await;
        });
    });
}
