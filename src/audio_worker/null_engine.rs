use tokio::sync::mpsc;

use super::messages::{AudioCommand, AudioEvent};
use crate::feed::FeedClient;

/// 无输出设备：照常经拦截层取文件，只是不发声
struct NullEngine {
    tx_evt: mpsc::Sender<AudioEvent>,
    rx_cmd: mpsc::Receiver<AudioCommand>,
    client: FeedClient,
    play_id: u64,
    paused: bool,
    playing: bool,
}

impl NullEngine {
    fn new(
        tx_evt: mpsc::Sender<AudioEvent>,
        rx_cmd: mpsc::Receiver<AudioCommand>,
        client: FeedClient,
    ) -> Self {
        Self {
            tx_evt,
            rx_cmd,
            client,
            play_id: 0,
            paused: false,
            playing: false,
        }
    }

    async fn run(mut self) {
        while let Some(cmd) = self.rx_cmd.recv().await {
            self.handle_audio_command(cmd).await;
        }
    }

    async fn now_playing(&mut self, title: String) {
        self.play_id = self.play_id.wrapping_add(1).max(1);
        self.paused = false;
        self.playing = true;
        let _ = self
            .tx_evt
            .send(AudioEvent::NowPlaying {
                play_id: self.play_id,
                title,
                duration_ms: None,
            })
            .await;
    }

    async fn handle_audio_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Play { url, title } => match self.client.fetch_audio(&url).await {
                Ok(path) => {
                    tracing::debug!(url = %url, path = %path.display(), "NullEngine: 音频已就绪");
                    self.now_playing(title).await;
                }
                Err(e) => {
                    let _ = self.tx_evt.send(AudioEvent::Error(e.to_string())).await;
                }
            },
            AudioCommand::TogglePause => {
                if !self.playing {
                    return;
                }
                self.paused = !self.paused;
                let _ = self.tx_evt.send(AudioEvent::Paused(self.paused)).await;
            }
            AudioCommand::Stop => {
                self.paused = false;
                self.playing = false;
                let _ = self.tx_evt.send(AudioEvent::Stopped).await;
            }
            AudioCommand::SetVolume(_) => {}
        }
    }
}

pub(super) fn spawn(
    rx_cmd: mpsc::Receiver<AudioCommand>,
    tx_evt: mpsc::Sender<AudioEvent>,
    client: FeedClient,
) {
    tokio::spawn(async move {
        let engine = NullEngine::new(tx_evt, rx_cmd, client);
        engine.run().await;
    });
}
