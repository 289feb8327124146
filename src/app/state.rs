use std::collections::HashSet;

use super::library::Library;
use crate::offline::normalize_key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// 清单加载失败，停留在该状态直到重新加载
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tracks,
    Categories,
}

/// 操作列的下载按钮文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadLabel {
    Download,
    Downloading,
    PlayOffline,
}

impl DownloadLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadLabel::Download => "Download",
            DownloadLabel::Downloading => "Downloading...",
            DownloadLabel::PlayOffline => "Play Offline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct App {
    pub library: Library,
    pub load_state: LoadState,
    pub focus: Focus,
    /// 可见列表中的选中行
    pub selected_row: usize,
    pub category_selected: usize,

    /// 以下集合的 key 都是规范化后的媒体地址
    pub cached: HashSet<String>,
    pub downloading: HashSet<String>,
    /// 正在解析源链接的曲目 id
    pub resolving: HashSet<String>,

    pub status: String,
    pub offline_ready: bool,

    pub now_playing: Option<String>,
    pub now_playing_id: Option<String>,
    pub play_status: String,
    pub paused: bool,
    pub play_id: u64,
    pub play_total_ms: Option<u64>,
    pub volume: f32,
}

impl Default for App {
    fn default() -> Self {
        Self {
            library: Library::default(),
            load_state: LoadState::Loading,
            focus: Focus::Tracks,
            selected_row: 0,
            category_selected: 0,
            cached: HashSet::new(),
            downloading: HashSet::new(),
            resolving: HashSet::new(),
            status: "Loading tracks...".to_owned(),
            offline_ready: false,
            now_playing: None,
            now_playing_id: None,
            play_status: "Stopped".to_owned(),
            paused: false,
            play_id: 0,
            play_total_ms: None,
            volume: 1.0,
        }
    }
}

impl App {
    pub fn is_cached(&self, url: &str) -> bool {
        self.cached.contains(normalize_key(url))
    }

    pub fn is_downloading(&self, url: &str) -> bool {
        self.downloading.contains(normalize_key(url))
    }

    pub fn download_label(&self, url: &str) -> DownloadLabel {
        if self.is_downloading(url) {
            DownloadLabel::Downloading
        } else if self.is_cached(url) {
            DownloadLabel::PlayOffline
        } else {
            DownloadLabel::Download
        }
    }

    /// 当前选中行对应的曲目下标
    pub fn selected_index(&self) -> Option<usize> {
        self.library.visible().get(self.selected_row).copied()
    }

    /// 过滤条件变化后把选中行夹回可见范围
    pub fn clamp_selection(&mut self) {
        let visible = self.library.visible().len();
        self.selected_row = self.selected_row.min(visible.saturating_sub(1));
        let categories = self.library.categories().len();
        self.category_selected = self.category_selected.min(categories.saturating_sub(1));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub duration: String,
    pub flair: Option<String>,
    pub download: DownloadLabel,
    pub resolving: bool,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: String,
    pub count: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub now_playing: Option<String>,
    pub play_status: String,
    pub paused: bool,
    pub play_total_ms: Option<u64>,
    pub volume: f32,
}

/// 发往 UI 的只读快照
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub query: String,
    pub status: String,
    pub load_state: LoadState,
    pub focus: Focus,
    pub rows: Vec<TrackRow>,
    pub selected_row: usize,
    pub total_tracks: usize,
    pub categories: Vec<CategoryRow>,
    pub category_selected: usize,
    pub category_summary: String,
    pub offline_ready: bool,
    pub player: PlayerSnapshot,
}

impl AppSnapshot {
    pub fn from_app(app: &App) -> Self {
        let rows = app
            .library
            .visible()
            .into_iter()
            .filter_map(|i| app.library.track(i))
            .map(|t| TrackRow {
                id: t.id.clone(),
                title: t.title.clone(),
                author: t.author.clone(),
                duration: t.duration.clone(),
                flair: t.flair.clone(),
                download: app.download_label(&t.media_url),
                resolving: app.resolving.contains(&t.id),
                playing: app.now_playing_id.as_deref() == Some(t.id.as_str()),
            })
            .collect();

        let categories = app
            .library
            .categories()
            .into_iter()
            .map(|c| CategoryRow {
                enabled: app.library.is_selected(&c.name),
                name: c.name,
                count: c.count,
            })
            .collect();

        Self {
            query: app.library.query().to_owned(),
            status: app.status.clone(),
            load_state: app.load_state.clone(),
            focus: app.focus,
            rows,
            selected_row: app.selected_row,
            total_tracks: app.library.tracks().len(),
            categories,
            category_selected: app.category_selected,
            category_summary: app.library.summary(),
            offline_ready: app.offline_ready,
            player: PlayerSnapshot {
                now_playing: app.now_playing.clone(),
                play_status: app.play_status.clone(),
                paused: app.paused,
                play_total_ms: app.play_total_ms,
                volume: app.volume,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Track;

    fn app_with(tracks: Vec<Track>) -> App {
        App {
            library: Library::new(tracks),
            load_state: LoadState::Ready,
            ..App::default()
        }
    }

    fn track(id: &str, url: &str) -> Track {
        Track {
            id: id.to_owned(),
            category: "funny".to_owned(),
            title: format!("title {id}"),
            media_url: url.to_owned(),
            ..Track::default()
        }
    }

    #[test]
    fn test_download_label_states() {
        let mut app = app_with(vec![track("a", "https://gwasi.com/audio/a.m4a")]);
        assert_eq!(
            app.download_label("https://gwasi.com/audio/a.m4a"),
            DownloadLabel::Download
        );

        app.downloading.insert("https://gwasi.com/audio/a.m4a".to_owned());
        assert_eq!(
            app.download_label("https://gwasi.com/audio/a.m4a?x=1"),
            DownloadLabel::Downloading
        );

        app.downloading.clear();
        app.cached.insert("https://gwasi.com/audio/a.m4a".to_owned());
        let snap = AppSnapshot::from_app(&app);
        assert_eq!(snap.rows[0].download, DownloadLabel::PlayOffline);
        assert_eq!(snap.rows[0].download.as_str(), "Play Offline");
    }

    #[test]
    fn test_clamp_selection_after_filter() {
        let mut app = app_with(vec![track("a", "u1"), track("b", "u2"), track("c", "u3")]);
        app.selected_row = 2;
        app.library.set_query("title a");
        app.clamp_selection();
        assert_eq!(app.selected_row, 0);
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn test_snapshot_category_rows() {
        let app = app_with(vec![track("a", "u1")]);
        let snap = AppSnapshot::from_app(&app);
        assert_eq!(
            snap.categories,
            vec![CategoryRow {
                name: "funny".to_owned(),
                count: 1,
                enabled: true,
            }]
        );
        assert_eq!(snap.category_summary, "1/1");
        assert_eq!(snap.total_tracks, 1);
    }
}
