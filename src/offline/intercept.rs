//! 网络拦截层
//!
//! 应用发起的所有 HTTP 请求都经过这里，按资源类型走两种策略：
//! 音频走缓存优先（未命中则下载并写入音频分区），
//! 其它请求走网络优先（网络失败时回退到已缓存的副本）。
//!
//! 生命周期：install 预取 shell 资源到 shell 分区；
//! activate 删除名字不是当前 shell 分区的所有分区，然后开始接管请求。

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;

use super::storage::{AUDIO_CACHE, CacheStorage, CachedResponse, Partition, normalize_key};
use crate::error::{CacheError, FeedError};

pub const AUDIO_EXTENSIONS: &[&str] = &["m4a", "mp3", "ogg", "wav", "flac"];

const WORKER_STATE_FILE: &str = "worker.json";

/// URL 路径是否以音频扩展名结尾（忽略 query）
pub fn is_audio_url(url: &str) -> bool {
    let path = normalize_key(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    last.rsplit_once('.').is_some_and(|(_, ext)| {
        AUDIO_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    })
}

/// 一次拦截请求
///
/// `url` 是逻辑地址（也是缓存 key），`via` 是实际发出请求的地址（例如经过 CORS 代理）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptRequest {
    pub url: String,
    pub via: Option<String>,
}

impl InterceptRequest {
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            via: None,
        }
    }

    pub fn via(url: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            via: Some(transport.into()),
        }
    }

    pub fn transport_url(&self) -> &str {
        self.via.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Network,
    Cache,
}

#[derive(Debug, Clone)]
pub enum Body {
    Memory(Vec<u8>),
    Stored(PathBuf),
}

#[derive(Debug, Clone)]
pub struct InterceptResponse {
    pub url: String,
    pub source: FetchSource,
    pub content_type: Option<String>,
    pub body: Body,
}

impl InterceptResponse {
    fn from_cache(hit: CachedResponse) -> Self {
        Self {
            url: hit.meta.url,
            source: FetchSource::Cache,
            content_type: hit.meta.content_type,
            body: Body::Stored(hit.body_path),
        }
    }

    pub async fn bytes(self) -> Result<Vec<u8>, FeedError> {
        match self.body {
            Body::Memory(b) => Ok(b),
            Body::Stored(p) => Ok(tokio::fs::read(p).await?),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkerState {
    installed: Option<String>,
    activated: bool,
}

#[derive(Debug, Clone)]
pub struct InterceptWorker {
    http: reqwest::Client,
    storage: CacheStorage,
    shell_name: String,
    controlling: Arc<AtomicBool>,
}

impl InterceptWorker {
    pub fn new(http: reqwest::Client, storage: CacheStorage, shell_name: impl Into<String>) -> Self {
        Self {
            http,
            storage,
            shell_name: shell_name.into(),
            controlling: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 是否已接管请求（activate 之后）
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::Acquire)
    }

    /// 启动时调用：当前 shell 版本已激活则直接接管，否则重新 install + activate
    pub async fn start(&self, shell: &[InterceptRequest]) -> Result<(), FeedError> {
        let state = self.load_state();
        if state.activated
            && state.installed.as_deref() == Some(self.shell_name.as_str())
            && self.storage.has(&self.shell_name)
        {
            tracing::debug!(shell = %self.shell_name, "拦截层已是最新版本，直接接管");
            self.controlling.store(true, Ordering::Release);
            return Ok(());
        }

        self.install(shell).await?;
        self.activate()?;
        Ok(())
    }

    /// 预取 shell 资源；任一资源失败则整体失败，不写入任何内容
    pub async fn install(&self, shell: &[InterceptRequest]) -> Result<(), FeedError> {
        tracing::info!(shell = %self.shell_name, resources = shell.len(), "拦截层 install 开始");
        let partition = self.storage.open(&self.shell_name)?;

        let mut fetched = Vec::with_capacity(shell.len());
        for req in shell {
            let (bytes, content_type) = self.network_bytes(req).await?;
            fetched.push((req.url.as_str(), bytes, content_type));
        }
        for (url, bytes, content_type) in fetched {
            partition.put(url, &bytes, content_type.as_deref())?;
        }

        // 不等待旧会话结束，直接进入待激活状态
        self.save_state(&WorkerState {
            installed: Some(self.shell_name.clone()),
            activated: false,
        })?;
        tracing::info!(shell = %self.shell_name, "拦截层 install 完成");
        Ok(())
    }

    /// 删除过期分区并接管请求，返回被删除的分区名
    pub fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.shell_name && self.storage.delete(&name)? {
                deleted.push(name);
            }
        }
        if !deleted.is_empty() {
            tracing::info!(deleted = ?deleted, "拦截层 activate：已删除过期分区");
        }

        self.save_state(&WorkerState {
            installed: Some(self.shell_name.clone()),
            activated: true,
        })?;
        self.controlling.store(true, Ordering::Release);
        Ok(deleted)
    }

    /// 按资源类型分派策略；未接管时直接走网络
    pub async fn fetch(&self, req: &InterceptRequest) -> Result<InterceptResponse, FeedError> {
        if !self.is_controlling() {
            return self.network(req).await;
        }
        if is_audio_url(&req.url) {
            return self.fetch_audio(req).await;
        }

        match self.network(req).await {
            Ok(resp) => Ok(resp),
            Err(e) if e.is_network_error() => {
                match self.storage.match_any(&req.url, &self.shell_name) {
                    Some(hit) => {
                        tracing::info!(url = %req.url, err = %e, "网络失败，回退到缓存副本");
                        Ok(InterceptResponse::from_cache(hit))
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// 音频：缓存优先，未命中则下载、写入音频分区后返回
    async fn fetch_audio(&self, req: &InterceptRequest) -> Result<InterceptResponse, FeedError> {
        let partition = self.storage.open(AUDIO_CACHE)?;
        if let Some(hit) = partition.match_url(&req.url) {
            return Ok(InterceptResponse::from_cache(hit));
        }
        let stored = self.download_into(&partition, req).await?;
        Ok(InterceptResponse {
            url: stored.meta.url,
            source: FetchSource::Network,
            content_type: stored.meta.content_type,
            body: Body::Stored(stored.body_path),
        })
    }

    async fn network(&self, req: &InterceptRequest) -> Result<InterceptResponse, FeedError> {
        let (bytes, content_type) = self.network_bytes(req).await?;
        Ok(InterceptResponse {
            url: req.url.clone(),
            source: FetchSource::Network,
            content_type,
            body: Body::Memory(bytes),
        })
    }

    pub(crate) async fn network_bytes(
        &self,
        req: &InterceptRequest,
    ) -> Result<(Vec<u8>, Option<String>), FeedError> {
        let resp = self.http.get(req.transport_url()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: req.url.clone(),
            });
        }
        let content_type = content_type_of(&resp);
        let bytes = resp.bytes().await?;
        Ok((bytes.to_vec(), content_type))
    }

    /// 把响应体流式写入分区临时文件，完成后原子提交
    pub(crate) async fn download_into(
        &self,
        partition: &Partition,
        req: &InterceptRequest,
    ) -> Result<CachedResponse, FeedError> {
        let resp = self.http.get(req.transport_url()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: req.url.clone(),
            });
        }
        let content_type = content_type_of(&resp);

        let tmp = partition.temp_file()?;
        let mut file = tokio::fs::File::from_std(tmp.reopen()?);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        drop(file);

        Ok(partition.commit(&req.url, tmp, content_type.as_deref())?)
    }

    fn state_path(&self) -> PathBuf {
        self.storage.root().join(WORKER_STATE_FILE)
    }

    fn load_state(&self) -> WorkerState {
        fs::read(self.state_path())
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok())
            .unwrap_or_default()
    }

    fn save_state(&self, state: &WorkerState) -> Result<(), CacheError> {
        fs::write(self.state_path(), serde_json::to_vec_pretty(state)?)?;
        Ok(())
    }
}

fn content_type_of(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::storage::SHELL_CACHE;

    fn worker(dir: &std::path::Path) -> (InterceptWorker, CacheStorage) {
        let storage = CacheStorage::new(dir).expect("storage");
        let w = InterceptWorker::new(reqwest::Client::new(), storage.clone(), SHELL_CACHE);
        (w, storage)
    }

    #[test]
    fn audio_extension_detection() {
        assert!(is_audio_url("https://gwasi.com/audio/abc.m4a"));
        assert!(is_audio_url("https://x/y/Track.MP3?dl=1"));
        assert!(!is_audio_url("https://gwasi.com/delta.json"));
        assert!(!is_audio_url("https://soundgasm.net/u/a/m4a-title"));
        assert!(!is_audio_url("https://x/m4a/"));
    }

    #[tokio::test]
    async fn install_and_activate_lifecycle() {
        let mut server = mockito::Server::new_async().await;
        let index = server
            .mock("GET", "/index.html")
            .with_body("<html>shell</html>")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let (w, storage) = worker(dir.path());
        storage
            .open("app-shell-v0")
            .expect("open")
            .put("https://old/", b"old", None)
            .expect("put");
        storage
            .open(AUDIO_CACHE)
            .expect("open")
            .put("https://old/a.m4a", b"a", None)
            .expect("put");

        let shell = vec![InterceptRequest::direct(format!("{}/index.html", server.url()))];
        w.start(&shell).await.expect("start");

        index.assert_async().await;
        assert!(w.is_controlling());
        assert_eq!(storage.keys().expect("keys"), vec![SHELL_CACHE.to_owned()]);
        assert!(storage.open(SHELL_CACHE).expect("open").contains(&shell[0].url));

        // 同一版本再次启动不重新 install
        let (again, _) = worker(dir.path());
        again.start(&shell).await.expect("start");
        assert!(again.is_controlling());
        index.assert_async().await;
    }

    #[tokio::test]
    async fn failed_install_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ok")
            .with_body("ok")
            .create_async()
            .await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let (w, storage) = worker(dir.path());
        let shell = vec![
            InterceptRequest::direct(format!("{}/ok", server.url())),
            InterceptRequest::direct(format!("{}/missing", server.url())),
        ];
        let err = w.install(&shell).await.expect_err("install should fail");
        assert!(matches!(err, FeedError::Status { .. }));
        assert!(!storage.open(SHELL_CACHE).expect("open").contains(&shell[0].url));
        assert!(!w.is_controlling());
    }

    #[tokio::test]
    async fn audio_requests_are_cache_first() {
        let mut server = mockito::Server::new_async().await;
        let audio = server
            .mock("GET", "/audio/abc.m4a")
            .with_header("content-type", "audio/mp4")
            .with_body("m4a-bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let (w, storage) = worker(dir.path());
        w.start(&[]).await.expect("start");

        let req = InterceptRequest::direct(format!("{}/audio/abc.m4a", server.url()));
        let first = w.fetch(&req).await.expect("fetch");
        assert_eq!(first.source, FetchSource::Network);
        assert!(storage.open(AUDIO_CACHE).expect("open").contains(&req.url));

        let second = w.fetch(&req).await.expect("fetch");
        assert_eq!(second.source, FetchSource::Cache);
        assert_eq!(second.bytes().await.expect("bytes"), b"m4a-bytes");
        audio.assert_async().await;
    }

    #[tokio::test]
    async fn documents_fall_back_to_cache_on_network_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (w, storage) = worker(dir.path());
        w.start(&[]).await.expect("start");

        // 没有服务监听的端口：连接失败
        let url = "http://127.0.0.1:9/delta.json".to_owned();
        storage
            .open(SHELL_CACHE)
            .expect("open")
            .put(&url, b"{\"entries\":[]}", Some("application/json"))
            .expect("put");

        let resp = w
            .fetch(&InterceptRequest::direct(url.clone()))
            .await
            .expect("fallback");
        assert_eq!(resp.source, FetchSource::Cache);
        assert_eq!(resp.bytes().await.expect("bytes"), b"{\"entries\":[]}");
    }

    #[tokio::test]
    async fn http_errors_do_not_fall_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/page")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let (w, storage) = worker(dir.path());
        w.start(&[]).await.expect("start");
        let url = format!("{}/page", server.url());
        storage
            .open(SHELL_CACHE)
            .expect("open")
            .put(&url, b"cached", None)
            .expect("put");

        let err = w
            .fetch(&InterceptRequest::direct(url))
            .await
            .expect_err("500 is returned as-is");
        assert!(matches!(err, FeedError::Status { .. }));
    }
}
