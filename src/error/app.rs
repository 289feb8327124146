//! 应用通用错误

use super::{AudioError, CacheError, FeedError, ResolveError};

/// 应用通用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("JSON 序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    /// 设置错误
    #[error("设置错误: {0}")]
    Settings(#[from] SettingsError),

    /// 网络请求错误
    #[error("网络错误: {0}")]
    Feed(#[from] FeedError),

    /// 离线缓存错误
    #[error("缓存错误: {0}")]
    Cache(#[from] CacheError),

    /// 链接解析错误
    #[error("解析错误: {0}")]
    Resolve(#[from] ResolveError),

    /// 音频错误
    #[error("音频错误: {0}")]
    Audio(#[from] AudioError),

    /// 其他错误
    #[error("{0}")]
    Other(String),
}

/// 设置相关错误
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// 保存设置失败
    #[error("保存设置失败: {source}")]
    Save {
        #[source]
        source: std::io::Error,
    },

    /// 序列化设置失败
    #[error("序列化设置失败: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
