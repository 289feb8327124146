//! 跨 Actor 边界的用户可见错误
//!
//! 所有失败都在触发它的用户操作处被捕获，转换成粗粒度的提示，
//! 只区分“抓取失败”和“没有找到匹配链接”。

/// 发往 UI 的错误提示
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// 清单加载失败，界面停留在错误状态直到重新加载
    #[error("Failed to load tracks. ({0})")]
    ManifestLoad(String),

    /// 离线下载失败
    #[error("Download failed: {title} ({detail})")]
    Download { title: String, detail: String },

    /// 源页面或目标页面抓取失败
    #[error("Failed to fetch source page: {title} ({detail})")]
    ResolveFetch { title: String, detail: String },

    /// 页面中没有匹配的链接
    #[error("No matching link found: {title}")]
    ResolveNotFound { title: String },

    /// 播放失败
    #[error("Playback failed: {0}")]
    Playback(String),

    /// 无法打开原始讨论页面
    #[error("Could not open {url}: {detail}")]
    OpenSource { url: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_load_message() {
        let err = MessageError::ManifestLoad("HTTP 状态码 500".to_owned());
        assert!(err.to_string().starts_with("Failed to load tracks."));
    }

    #[test]
    fn test_not_found_message_has_no_detail() {
        let err = MessageError::ResolveNotFound {
            title: "Hello World".to_owned(),
        };
        assert_eq!(err.to_string(), "No matching link found: Hello World");
    }
}
