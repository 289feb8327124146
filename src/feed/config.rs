use directories::ProjectDirs;
use std::path::PathBuf;

use crate::domain::Track;
use crate::offline::InterceptRequest;

pub const DEFAULT_MANIFEST_URL: &str = "https://gwasi.com/delta.json";
pub const DEFAULT_PROXY_PREFIX: &str = "https://corsproxy.io/?";
pub const DEFAULT_MEDIA_URL_TEMPLATE: &str = "https://gwasi.com/audio/{id}.m4a";
pub const DEFAULT_SOURCE_URL_TEMPLATE: &str = "https://www.reddit.com/r/{category}/comments/{id}";
pub const DEFAULT_FORUM_HOST: &str = "reddit.com";
pub const DEFAULT_TARGET_HOST: &str = "soundgasm.net";

/// 按模板生成音频地址（`{id}` 占位）
pub fn expand_media_url(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub manifest_url: String,
    /// 透传代理前缀；为 None 时直连
    pub proxy_prefix: Option<String>,
    pub media_url_template: String,
    pub source_url_template: String,
    /// 讨论区域名：这些页面改为请求其 JSON 表示
    pub forum_hosts: Vec<String>,
    /// 需要从页面中抽取链接的第三方音频托管站点
    pub target_host: String,
    /// install 时预取到 shell 分区的资源
    pub shell_resources: Vec<String>,
    pub data_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("com", "gwasi", "gwasi-ratui")
            .map(|p| p.data_local_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("gwasi-ratui"));
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_owned(),
            proxy_prefix: Some(DEFAULT_PROXY_PREFIX.to_owned()),
            media_url_template: DEFAULT_MEDIA_URL_TEMPLATE.to_owned(),
            source_url_template: DEFAULT_SOURCE_URL_TEMPLATE.to_owned(),
            forum_hosts: vec![DEFAULT_FORUM_HOST.to_owned()],
            target_host: DEFAULT_TARGET_HOST.to_owned(),
            shell_resources: vec![DEFAULT_MANIFEST_URL.to_owned()],
            data_dir,
            http_timeout_secs: 30,
            http_connect_timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// 页面类请求：经代理转发，缓存 key 仍是原始地址
    pub fn page_request(&self, url: &str) -> InterceptRequest {
        match self.proxy_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                InterceptRequest::via(url, format!("{prefix}{url}"))
            }
            _ => InterceptRequest::direct(url),
        }
    }

    pub fn shell_requests(&self) -> Vec<InterceptRequest> {
        self.shell_resources
            .iter()
            .map(|u| self.page_request(u))
            .collect()
    }

    /// 原始讨论页面地址
    pub fn source_url(&self, track: &Track) -> String {
        self.source_url_template
            .replace("{category}", &track.category)
            .replace("{id}", &track.id)
    }
}
