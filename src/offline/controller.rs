use std::path::PathBuf;

use super::intercept::{InterceptRequest, InterceptWorker};
use super::storage::{AUDIO_CACHE, CacheStorage};
use crate::error::FeedError;

/// 离线缓存控制：查询是否已缓存、按需下载并持久化
///
/// 并发的重复 `persist` 可能各自下载一次，后写入者覆盖前者。
#[derive(Debug, Clone)]
pub struct OfflineController {
    storage: CacheStorage,
    worker: InterceptWorker,
}

impl OfflineController {
    pub fn new(storage: CacheStorage, worker: InterceptWorker) -> Self {
        Self { storage, worker }
    }

    /// 忽略 query 查询音频分区
    pub fn is_cached(&self, url: &str) -> bool {
        self.storage
            .open(AUDIO_CACHE)
            .is_ok_and(|p| p.contains(url))
    }

    /// 未缓存则下载并写入音频分区；已缓存直接返回本地路径
    pub async fn persist(&self, url: &str) -> Result<PathBuf, FeedError> {
        let partition = self.storage.open(AUDIO_CACHE)?;
        if let Some(hit) = partition.match_url(url) {
            tracing::debug!(url, "已在离线缓存中");
            return Ok(hit.body_path);
        }
        tracing::info!(url, "开始离线下载");
        let stored = self
            .worker
            .download_into(&partition, &InterceptRequest::direct(url))
            .await?;
        tracing::info!(url, size_bytes = stored.meta.size_bytes, "离线下载完成");
        Ok(stored.body_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::storage::SHELL_CACHE;

    #[tokio::test]
    async fn is_cached_flips_after_persist_ignoring_query() {
        let mut server = mockito::Server::new_async().await;
        let audio = server
            .mock("GET", "/audio/abc.m4a")
            .match_query(mockito::Matcher::Any)
            .with_body("bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        let worker = InterceptWorker::new(reqwest::Client::new(), storage.clone(), SHELL_CACHE);
        let offline = OfflineController::new(storage, worker);

        let url = format!("{}/audio/abc.m4a?sig=1", server.url());
        assert!(!offline.is_cached(&url));

        let path = offline.persist(&url).await.expect("persist");
        assert!(path.is_file());
        assert!(offline.is_cached(&url));
        assert!(offline.is_cached(&format!("{}/audio/abc.m4a", server.url())));

        // 幂等：第二次不再请求网络
        let again = offline.persist(&url).await.expect("persist");
        assert_eq!(again, path);
        audio.assert_async().await;
    }

    #[tokio::test]
    async fn failed_persist_leaves_nothing_cached() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio/gone.m4a")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        let worker = InterceptWorker::new(reqwest::Client::new(), storage.clone(), SHELL_CACHE);
        let offline = OfflineController::new(storage, worker);

        let url = format!("{}/audio/gone.m4a", server.url());
        assert!(offline.persist(&url).await.is_err());
        assert!(!offline.is_cached(&url));
        let audio = offline.storage.open(AUDIO_CACHE).expect("open");
        assert_eq!(audio.stats().entries, 0);
    }
}
