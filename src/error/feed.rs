//! 网络请求（清单、页面、音频）相关错误

use reqwest::StatusCode;

use super::CacheError;

/// 网络层错误类型
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// 请求未得到响应（连接失败、超时等）
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 响应状态码非 2xx
    #[error("HTTP 状态码 {status}: {url}")]
    Status { status: StatusCode, url: String },

    /// 响应解析失败
    #[error("JSON 解析失败: {0}")]
    Serde(#[from] serde_json::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 缓存读写失败
    #[error("缓存错误: {0}")]
    Cache(#[from] CacheError),
}

impl FeedError {
    /// 判断是否是网络错误（只有这类错误才会回退到缓存副本）
    pub fn is_network_error(&self) -> bool {
        matches!(self, FeedError::Http(_))
    }
}
