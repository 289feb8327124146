//! 曲目列表与过滤：纯函数，不做 I/O
//!
//! 过滤只在内存中的曲目集合上重新计算，从不重新请求清单。

use std::collections::{BTreeSet, HashMap};

use crate::domain::{CategoryCount, Track};

#[derive(Debug, Clone, Default)]
pub struct Library {
    tracks: Vec<Track>,
    query: String,
    selected: BTreeSet<String>,
}

impl Library {
    /// 默认只勾选出现次数最多的分类
    pub fn new(tracks: Vec<Track>) -> Self {
        let selected = default_selection(&tracks);
        Self {
            tracks,
            query: String::new(),
            selected,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// 可见曲目的下标，保持清单顺序
    pub fn visible(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| matches(t, &self.query, &self.selected))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn categories(&self) -> Vec<CategoryCount> {
        category_counts(&self.tracks)
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.contains(category)
    }

    /// 切换分类勾选，返回切换后的状态
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if self.selected.remove(category) {
            false
        } else {
            self.selected.insert(category.to_owned());
            true
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.tracks.iter().map(|t| t.category.clone()).collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// 恢复上次保存的勾选；只保留当前清单中存在的分类，结果为空则保持默认
    pub fn restore_selection(&mut self, saved: &[String]) {
        let known: BTreeSet<&str> = self.tracks.iter().map(|t| t.category.as_str()).collect();
        let restored: BTreeSet<String> = saved
            .iter()
            .filter(|c| known.contains(c.as_str()))
            .cloned()
            .collect();
        if !restored.is_empty() {
            self.selected = restored;
        }
    }

    /// 分类摘要 "{已勾选}/{总数}"
    pub fn summary(&self) -> String {
        let categories = self.categories();
        let enabled = categories
            .iter()
            .filter(|c| self.selected.contains(&c.name))
            .count();
        format!("{enabled}/{}", categories.len())
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn find(&self, track_id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }
}

/// 标题或作者包含查询串（忽略大小写），且分类已勾选
pub fn matches(track: &Track, query: &str, selected: &BTreeSet<String>) -> bool {
    if !selected.contains(&track.category) {
        return false;
    }
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    track.title.to_lowercase().contains(&needle) || track.author.to_lowercase().contains(&needle)
}

/// 按数量降序、名称升序
pub fn category_counts(tracks: &[Track]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in tracks {
        *counts.entry(t.category.as_str()).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_owned(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    out
}

pub fn default_selection(tracks: &[Track]) -> BTreeSet<String> {
    category_counts(tracks)
        .into_iter()
        .next()
        .map(|c| BTreeSet::from([c.name]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, category: &str, title: &str, author: &str) -> Track {
        Track {
            id: id.to_owned(),
            category: category.to_owned(),
            title: title.to_owned(),
            author: author.to_owned(),
            ..Track::default()
        }
    }

    fn sample() -> Vec<Track> {
        vec![
            track("1", "funny", "Hello World", "alice"),
            track("2", "funny", "Rainy Night", "bob"),
            track("3", "asmr", "Soft Whisper", "carol"),
            track("4", "story", "Long Road", "Alice"),
        ]
    }

    #[test]
    fn test_default_selection_is_most_frequent_category() {
        let lib = Library::new(sample());
        assert_eq!(
            lib.selected().iter().cloned().collect::<Vec<_>>(),
            vec!["funny".to_owned()]
        );
        assert_eq!(lib.visible(), vec![0, 1]);
    }

    #[test]
    fn test_default_selection_tie_breaks_alphabetically() {
        let lib = Library::new(vec![track("1", "zeta", "a", "x"), track("2", "alpha", "b", "y")]);
        assert!(lib.is_selected("alpha"));
        assert!(!lib.is_selected("zeta"));
    }

    #[test]
    fn test_query_matches_title_or_author_case_insensitive() {
        let mut lib = Library::new(sample());
        lib.select_all();
        lib.set_query("ALICE");
        assert_eq!(lib.visible(), vec![0, 3]);
        lib.set_query("night");
        assert_eq!(lib.visible(), vec![1]);
        lib.set_query("   ");
        assert_eq!(lib.visible().len(), 4);
    }

    #[test]
    fn test_category_counts_sorted() {
        let counts = category_counts(&sample());
        let names: Vec<_> = counts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["funny", "asmr", "story"]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_toggle_and_summary() {
        let mut lib = Library::new(sample());
        assert_eq!(lib.summary(), "1/3");
        assert!(lib.toggle_category("asmr"));
        assert_eq!(lib.summary(), "2/3");
        assert_eq!(lib.visible(), vec![0, 1, 2]);
        assert!(!lib.toggle_category("funny"));
        assert_eq!(lib.visible(), vec![2]);
        lib.select_none();
        assert!(lib.visible().is_empty());
        assert_eq!(lib.summary(), "0/3");
    }

    #[test]
    fn test_restore_selection_ignores_unknown_categories() {
        let mut lib = Library::new(sample());
        lib.restore_selection(&["gone".to_owned()]);
        assert!(lib.is_selected("funny"));
        lib.restore_selection(&["story".to_owned(), "gone".to_owned()]);
        assert_eq!(lib.visible(), vec![3]);
    }

    #[test]
    fn test_empty_library() {
        let lib = Library::new(Vec::new());
        assert!(lib.is_empty());
        assert!(lib.visible().is_empty());
        assert_eq!(lib.summary(), "0/0");
    }
}
