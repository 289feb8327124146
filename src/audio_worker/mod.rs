mod engine;
mod messages;
mod null_engine;
mod player;

use tokio::sync::mpsc;

use crate::feed::FeedClient;

pub use messages::{AudioCommand, AudioEvent};

/// 音频后端：真实输出设备，或无设备的空实现（`--no-audio`、测试）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackend {
    Real,
    Null,
}

pub fn spawn_audio_worker(
    backend: AudioBackend,
    client: FeedClient,
) -> (mpsc::Sender<AudioCommand>, mpsc::Receiver<AudioEvent>) {
    let (tx_cmd, rx_cmd) = mpsc::channel::<AudioCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<AudioEvent>(64);

    match backend {
        AudioBackend::Real => engine::spawn(rx_cmd, tx_evt, client),
        AudioBackend::Null => null_engine::spawn(rx_cmd, tx_evt, client),
    }

    (tx_cmd, rx_evt)
}
