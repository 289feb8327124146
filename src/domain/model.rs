use serde::{Deserialize, Serialize};

/// 清单中的一条音频
///
/// 除 `media_url` 外不可变：解析到更具体的直链后会原地覆盖它。
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub category: String,
    pub author: String,
    pub flair: Option<String>,
    pub title: String,
    pub timestamp: i64,
    pub duration: String,
    pub comments: i64,
    pub user: String,
    pub media_url: String,
}

/// 某个分类在清单中出现的次数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}
