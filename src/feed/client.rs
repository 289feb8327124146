use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::config::FeedConfig;
use super::manifest;
use crate::domain::Track;
use crate::error::FeedError;
use crate::offline::{
    AUDIO_CACHE, CacheStorage, FetchSource, InterceptRequest, InterceptWorker, OfflineController,
    SHELL_CACHE,
};

/// 所有网络访问的入口：清单、页面、音频都经过拦截层
#[derive(Debug, Clone)]
pub struct FeedClient {
    cfg: Arc<FeedConfig>,
    storage: CacheStorage,
    worker: InterceptWorker,
    offline: OfflineController,
}

impl FeedClient {
    pub fn new(cfg: FeedConfig) -> Result<Self, FeedError> {
        fs::create_dir_all(&cfg.data_dir)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("gwasi-ratui/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.http_connect_timeout_secs))
            .build()?;

        let storage = CacheStorage::new(&cfg.data_dir)?;
        let worker = InterceptWorker::new(http, storage.clone(), SHELL_CACHE);
        let offline = OfflineController::new(storage.clone(), worker.clone());

        Ok(Self {
            cfg: Arc::new(cfg),
            storage,
            worker,
            offline,
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.cfg
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// 启动拦截层生命周期（必要时 install + activate）
    pub async fn start_worker(&self) -> Result<bool, FeedError> {
        self.worker.start(&self.cfg.shell_requests()).await?;
        Ok(self.worker.is_controlling())
    }

    /// 加载清单：优先读缓存；未命中（或强制刷新）时经代理请求并写回缓存
    pub async fn load_manifest(&self, force_refresh: bool) -> Result<Vec<Track>, FeedError> {
        let url = self.cfg.manifest_url.as_str();
        let partition = self.storage.open(AUDIO_CACHE)?;

        if !force_refresh && let Some(hit) = partition.match_url(url) {
            let parsed = hit
                .bytes()
                .await
                .map_err(FeedError::from)
                .and_then(|b| {
                    manifest::parse_manifest(&b, &self.cfg.media_url_template).map_err(Into::into)
                });
            match parsed {
                Ok(tracks) => {
                    tracing::info!(url, tracks = tracks.len(), "清单来自缓存");
                    return Ok(tracks);
                }
                Err(e) => tracing::warn!(url, err = %e, "缓存的清单无法解析，重新拉取"),
            }
        }

        let resp = self.worker.fetch(&self.cfg.page_request(url)).await?;
        let source = resp.source;
        let content_type = resp.content_type.clone();
        let bytes = resp.bytes().await?;
        let tracks = manifest::parse_manifest(&bytes, &self.cfg.media_url_template)?;

        if source == FetchSource::Network {
            partition.put(url, &bytes, content_type.as_deref())?;
        }
        tracing::info!(url, tracks = tracks.len(), ?source, "清单加载完成");
        Ok(tracks)
    }

    /// 页面类请求（经代理）
    pub async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let resp = self.worker.fetch(&self.cfg.page_request(url)).await?;
        resp.bytes().await
    }

    /// 播放用：直连请求音频，经拦截层缓存优先策略，返回本地文件
    ///
    /// 拦截层尚未接管时退化为离线下载，保证总能得到可解码的本地文件。
    pub async fn fetch_audio(&self, url: &str) -> Result<PathBuf, FeedError> {
        if !self.worker.is_controlling() {
            return self.offline.persist(url).await;
        }
        let resp = self.worker.fetch(&InterceptRequest::direct(url)).await?;
        match resp.body {
            crate::offline::intercept::Body::Stored(path) => Ok(path),
            crate::offline::intercept::Body::Memory(bytes) => {
                let partition = self.storage.open(AUDIO_CACHE)?;
                Ok(partition
                    .put(url, &bytes, resp.content_type.as_deref())?
                    .body_path)
            }
        }
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.offline.is_cached(url)
    }

    pub async fn persist(&self, url: &str) -> Result<PathBuf, FeedError> {
        self.offline.persist(url).await
    }
}
