use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tokio::sync::mpsc;

use super::messages::AudioEvent;
use crate::error::AudioError;

struct ActiveSink {
    sink: Arc<Sink>,
    end_cancel: Arc<AtomicBool>,
}

pub struct PlayerState {
    mixer: Mixer,
    #[allow(dead_code)]
    stream: OutputStream,
    current: Option<ActiveSink>,
    play_id: u64,
    paused: bool,
    volume: f32,
}

impl PlayerState {
    pub fn new(mixer: Mixer, stream: OutputStream) -> Self {
        Self {
            mixer,
            stream,
            current: None,
            play_id: 0,
            paused: false,
            volume: 1.0,
        }
    }

    pub fn play_id(&self) -> u64 {
        self.play_id
    }

    pub fn stop(&mut self) {
        self.play_id = self.play_id.wrapping_add(1).max(1);
        if let Some(cur) = self.current.take() {
            tracing::debug!(
                play_id = self.play_id,
                "Stopping current sink, signaling end check thread to cancel"
            );
            cur.end_cancel.store(true, Ordering::Relaxed);
            cur.sink.stop();
        }
    }

    pub fn current_sink(&self) -> Option<Arc<Sink>> {
        self.current.as_ref().map(|cur| Arc::clone(&cur.sink))
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// 停掉当前音轨，从本地文件构建新 sink 并开始播放
    pub fn start(
        &mut self,
        tx_evt: &mpsc::Sender<AudioEvent>,
        path: &Path,
        title: &str,
    ) -> Result<Option<u64>, AudioError> {
        let (sink, duration_ms) = build_sink_from_path(&self.mixer, path, title)?;
        self.stop();
        self.paused = false;

        let sink = Arc::new(sink);
        sink.set_volume(self.volume);
        sink.play();
        self.attach_sink(tx_evt, sink);
        Ok(duration_ms)
    }

    fn attach_sink(&mut self, tx_evt: &mpsc::Sender<AudioEvent>, sink: Arc<Sink>) {
        let play_id = self.play_id;
        let tx_end = tx_evt.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let sink_end = Arc::clone(&sink);
        let cancel_end = Arc::clone(&cancel);

        tracing::debug!(play_id, "Spawning end check thread");

        // 线程创建失败只影响“播放结束”事件，不影响播放本身
        let spawned = thread::Builder::new()
            .name(format!("audio-end-check-{play_id}"))
            .spawn(move || {
                let start = std::time::Instant::now();
                sink_end.sleep_until_end();
                let elapsed = start.elapsed();

                if !cancel_end.load(Ordering::Relaxed) {
                    tracing::debug!(
                        play_id,
                        elapsed_ms = elapsed.as_millis(),
                        "End check thread exiting naturally"
                    );
                    let _ = tx_end.blocking_send(AudioEvent::Ended { play_id });
                } else {
                    tracing::debug!(
                        play_id,
                        elapsed_ms = elapsed.as_millis(),
                        "End check thread was cancelled"
                    );
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(play_id, err = %e, "无法创建播放结束检测线程");
        }

        self.current = Some(ActiveSink {
            sink,
            end_cancel: cancel,
        });
    }
}

fn build_sink_from_path(
    mixer: &Mixer,
    path: &Path,
    title: &str,
) -> Result<(Sink, Option<u64>), AudioError> {
    if !path.is_file() {
        return Err(AudioError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| AudioError::OpenFile {
        title: title.to_owned(),
        source,
    })?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        title: title.to_owned(),
        source,
    })?;
    let duration_ms = decoder.total_duration().map(|d| d.as_millis() as u64);

    let sink = Sink::connect_new(mixer);
    sink.append(decoder);
    Ok((sink, duration_ms))
}
