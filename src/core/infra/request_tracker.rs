//! 过期请求丢弃
//!
//! 同一 key 只保留最新的 req_id：重新加载清单后，旧请求的响应到达时会被丢弃。

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct RequestTracker<K> {
    pending: HashMap<K, u64>,
}

impl<K: Eq + Hash> Default for RequestTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> RequestTracker<K> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// 发起新请求，覆盖同一 key 上尚未返回的旧请求
    pub fn issue(&mut self, key: K, next_id_fn: impl FnOnce() -> u64) -> u64 {
        let id = next_id_fn();
        self.pending.insert(key, id);
        id
    }

    /// 只有 req_id 与最新请求一致时才接受，并清除 pending 状态
    pub fn accept(&mut self, key: &K, req_id: u64) -> bool {
        match self.pending.get(key) {
            Some(&pending_id) if pending_id == req_id => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    /// 响应是否属于该 key 的最新请求（不消费）
    pub fn owns(&self, key: &K, req_id: u64) -> bool {
        self.pending.get(key) == Some(&req_id)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}

/// 需要“只认最新”的请求类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    /// 拦截层启动
    Worker,
    /// 清单加载
    Manifest,
}
