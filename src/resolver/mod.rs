//! 源链接解析：讨论页 → 托管站点页面 → 音频文件地址

pub mod extract;

use crate::error::{FeedError, ResolveError};
use crate::feed::FeedClient;
use crate::offline::is_audio_url;

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// 源页面中找到的全部托管站点链接（去重、按出现顺序）
    pub source_links: Vec<String>,
    pub media_url: String,
}

/// 从讨论页地址解析出可播放的音频地址
///
/// 讨论区页面改为请求其 JSON 表示并取正文片段；
/// 第一个托管站点链接本身就是音频时直接使用，否则再抓取该页面取第一个音频链接。
pub async fn resolve_media_url(
    client: &FeedClient,
    source_url: &str,
) -> Result<Resolution, ResolveError> {
    let cfg = client.config();
    let host = cfg.target_host.as_str();

    let html = if extract::is_forum_url(source_url, &cfg.forum_hosts) {
        let json_url = extract::forum_json_url(source_url);
        tracing::debug!(source_url, %json_url, "讨论页改为请求 JSON");
        let bytes = client.fetch_page(&json_url).await?;
        let payload: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(FeedError::from)?;
        extract::forum_fragment(&payload)
    } else {
        String::from_utf8_lossy(&client.fetch_page(source_url).await?).into_owned()
    };

    let source_links = extract::extract_host_links(&html, host);
    let Some(first) = source_links.first().cloned() else {
        return Err(ResolveError::NoLinks {
            url: source_url.to_owned(),
            host: host.to_owned(),
        });
    };

    if is_audio_url(&first) {
        tracing::info!(source_url, media_url = %first, "源页面直接给出音频链接");
        return Ok(Resolution {
            source_links,
            media_url: first,
        });
    }

    let page = client.fetch_page(&first).await?;
    let audio = extract::extract_audio_links(&String::from_utf8_lossy(&page));
    match audio.into_iter().next() {
        Some(media_url) => {
            tracing::info!(source_url, page = %first, %media_url, "解析到音频链接");
            Ok(Resolution {
                source_links,
                media_url,
            })
        }
        None => Err(ResolveError::NoAudio { url: first }),
    }
}
