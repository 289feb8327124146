//! 按 URL 索引的持久化缓存存储
//!
//! 每个分区对应 `{data_dir}/cache_storage/{name}/` 目录，
//! 每条记录由 `{md5}.bin`（响应体）和 `{md5}.json`（元数据）组成。
//! 文件名取自去掉 query/fragment 后的 URL，因此匹配时忽略查询串。

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

use crate::error::CacheError;

pub const SHELL_CACHE: &str = "app-shell-v1";
pub const AUDIO_CACHE: &str = "audio-cache-v1";

const STORAGE_DIR: &str = "cache_storage";

/// 去掉 query 与 fragment，作为缓存 key
pub fn normalize_key(url: &str) -> &str {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    &url[..end]
}

fn entry_stem(url: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(normalize_key(url).as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    pub url: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub stored_at_ms: u64,
}

/// 命中的缓存记录
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub meta: EntryMeta,
    pub body_path: PathBuf,
}

impl CachedResponse {
    pub async fn bytes(&self) -> Result<Vec<u8>, CacheError> {
        Ok(tokio::fs::read(&self.body_path).await?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub entries: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(data_dir: &Path) -> Result<Self, CacheError> {
        let root = data_dir.join(STORAGE_DIR);
        fs::create_dir_all(&root).map_err(|e| {
            tracing::warn!(dir = %root.display(), err = %e, "创建缓存目录失败");
            CacheError::DirUnavailable
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 打开（不存在则创建）命名分区
    pub fn open(&self, name: &str) -> Result<Partition, CacheError> {
        validate_name(name)?;
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(Partition {
            name: name.to_owned(),
            dir,
        })
    }

    /// 列出所有分区名（按名称排序）
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names = fs::read_dir(&self.root)?
            .flatten()
            .filter(|ent| ent.path().is_dir())
            .filter_map(|ent| ent.file_name().to_str().map(ToOwned::to_owned))
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    pub fn has(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.root.join(name).is_dir()
    }

    /// 删除整个分区，返回分区此前是否存在
    pub fn delete(&self, name: &str) -> Result<bool, CacheError> {
        validate_name(name)?;
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        Ok(true)
    }

    /// 依次在各分区查找，`first` 分区优先
    pub fn match_any(&self, url: &str, first: &str) -> Option<CachedResponse> {
        let mut names = self.keys().ok()?;
        if let Some(pos) = names.iter().position(|n| n == first) {
            let name = names.remove(pos);
            names.insert(0, name);
        }
        names
            .iter()
            .filter_map(|name| self.open(name).ok())
            .find_map(|p| p.match_url(url))
    }
}

fn validate_name(name: &str) -> Result<(), CacheError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(CacheError::InvalidPartition(name.to_owned()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Partition {
    name: String,
    dir: PathBuf,
}

impl Partition {
    /// 响应体在磁盘上的位置（不保证存在）
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", entry_stem(url)))
    }

    fn meta_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", entry_stem(url)))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.path_for(url).is_file() && self.meta_path(url).is_file()
    }

    pub fn match_url(&self, url: &str) -> Option<CachedResponse> {
        let body_path = self.path_for(url);
        if !body_path.is_file() {
            return None;
        }
        let bytes = fs::read(self.meta_path(url)).ok()?;
        let meta = serde_json::from_slice::<EntryMeta>(&bytes).ok()?;
        tracing::trace!(partition = %self.name, url, "缓存命中");
        Some(CachedResponse { meta, body_path })
    }

    pub fn put(
        &self,
        url: &str,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<CachedResponse, CacheError> {
        let mut tmp = self.temp_file()?;
        tmp.write_all(body)?;
        tmp.flush()?;
        self.commit(url, tmp, content_type)
    }

    /// 在分区目录内创建临时文件，供流式写入后 `commit`
    pub fn temp_file(&self) -> Result<NamedTempFile, CacheError> {
        Ok(NamedTempFile::new_in(&self.dir)?)
    }

    /// 原子地把临时文件提交为 `url` 对应的记录
    ///
    /// 先落响应体再落元数据：元数据存在即代表记录完整。
    pub fn commit(
        &self,
        url: &str,
        tmp: NamedTempFile,
        content_type: Option<&str>,
    ) -> Result<CachedResponse, CacheError> {
        let body_path = self.path_for(url);
        tmp.persist(&body_path).map_err(|e| e.error)?;
        let size_bytes = fs::metadata(&body_path).map(|m| m.len()).unwrap_or(0);

        let meta = EntryMeta {
            url: url.to_owned(),
            content_type: content_type.map(ToOwned::to_owned),
            size_bytes,
            stored_at_ms: now_ms(),
        };
        let mut meta_tmp = self.temp_file()?;
        meta_tmp.write_all(&serde_json::to_vec_pretty(&meta)?)?;
        meta_tmp.persist(self.meta_path(url)).map_err(|e| e.error)?;

        tracing::debug!(partition = %self.name, url, size_bytes, "缓存已写入");
        Ok(CachedResponse { meta, body_path })
    }

    pub fn stats(&self) -> PartitionStats {
        let Ok(rd) = fs::read_dir(&self.dir) else {
            return PartitionStats::default();
        };
        rd.flatten()
            .map(|ent| ent.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
            .fold(PartitionStats::default(), |mut acc, p| {
                acc.entries += 1;
                acc.bytes += fs::metadata(&p).map(|m| m.len()).unwrap_or(0);
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_strips_query_and_fragment() {
        assert_eq!(
            normalize_key("https://gwasi.com/audio/abc.m4a?x=1#t"),
            "https://gwasi.com/audio/abc.m4a"
        );
        assert_eq!(normalize_key("https://a/b#frag"), "https://a/b");
        assert_eq!(normalize_key("https://a/b"), "https://a/b");
    }

    #[test]
    fn put_then_match_ignores_query() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        let p = storage.open(AUDIO_CACHE).expect("open");

        assert!(p.match_url("https://gwasi.com/audio/abc.m4a").is_none());
        p.put(
            "https://gwasi.com/audio/abc.m4a?token=1",
            b"audio-bytes",
            Some("audio/mp4"),
        )
        .expect("put");

        let hit = p
            .match_url("https://gwasi.com/audio/abc.m4a?token=2")
            .expect("hit");
        assert_eq!(hit.meta.size_bytes, 11);
        assert_eq!(hit.meta.content_type.as_deref(), Some("audio/mp4"));
        assert_eq!(fs::read(&hit.body_path).expect("read"), b"audio-bytes");
        assert!(p.contains("https://gwasi.com/audio/abc.m4a"));
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        let p = storage.open(AUDIO_CACHE).expect("open");

        p.put("https://a/x", b"one", None).expect("put");
        p.put("https://a/x", b"second", None).expect("put");
        let hit = p.match_url("https://a/x").expect("hit");
        assert_eq!(fs::read(&hit.body_path).expect("read"), b"second");
        assert_eq!(p.stats(), PartitionStats { entries: 1, bytes: 6 });
    }

    #[test]
    fn keys_and_delete_partitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        storage.open(SHELL_CACHE).expect("open");
        storage.open(AUDIO_CACHE).expect("open");

        assert_eq!(
            storage.keys().expect("keys"),
            vec![SHELL_CACHE.to_owned(), AUDIO_CACHE.to_owned()]
        );
        assert!(storage.delete(AUDIO_CACHE).expect("delete"));
        assert!(!storage.delete(AUDIO_CACHE).expect("delete"));
        assert!(!storage.has(AUDIO_CACHE));
        assert!(storage.has(SHELL_CACHE));
    }

    #[test]
    fn rejects_path_like_partition_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        assert!(matches!(
            storage.open("../escape"),
            Err(CacheError::InvalidPartition(_))
        ));
        assert!(storage.open("").is_err());
    }

    #[test]
    fn match_any_prefers_first_partition() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = CacheStorage::new(dir.path()).expect("storage");
        let shell = storage.open(SHELL_CACHE).expect("open");
        let audio = storage.open(AUDIO_CACHE).expect("open");
        audio.put("https://a/index", b"audio", None).expect("put");
        shell.put("https://a/index", b"shell", None).expect("put");

        let hit = storage.match_any("https://a/index", SHELL_CACHE).expect("hit");
        assert_eq!(fs::read(&hit.body_path).expect("read"), b"shell");

        assert!(storage.delete(SHELL_CACHE).expect("delete"));
        let hit = storage.match_any("https://a/index", SHELL_CACHE).expect("hit");
        assert_eq!(fs::read(&hit.body_path).expect("read"), b"audio");
    }
}
