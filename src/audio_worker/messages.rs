#[derive(Debug)]
pub enum AudioCommand {
    /// 经拦截层取得本地文件后播放（缓存优先）
    Play {
        url: String,
        title: String,
    },
    TogglePause,
    Stop,
    SetVolume(f32),
}

#[derive(Debug)]
pub enum AudioEvent {
    NowPlaying {
        play_id: u64,
        title: String,
        duration_ms: Option<u64>,
    },
    Paused(bool),
    Stopped,
    Ended {
        play_id: u64,
    },
    Error(String),
}
