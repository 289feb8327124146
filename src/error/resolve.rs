//! 源链接解析相关错误

use super::FeedError;

/// 解析错误只分两类：抓取失败 / 没有找到匹配链接
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// 任一阶段的页面抓取失败
    #[error("获取页面失败: {0}")]
    Fetch(#[from] FeedError),

    /// 源页面中没有目标站点的链接
    #[error("页面中未找到 {host} 链接: {url}")]
    NoLinks { url: String, host: String },

    /// 目标站点页面中没有音频链接
    #[error("页面中未找到音频链接: {url}")]
    NoAudio { url: String },
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NoLinks { .. } | ResolveError::NoAudio { .. })
    }
}
