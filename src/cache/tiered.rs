use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use super::backend::RemoteBackend;
use super::memory::LocalStore;
use crate::clock::Clock;

/// 缓存状态
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub backend: &'static str,
    pub remote_connected: bool,
    pub local_entries: usize,
}

/// 远程优先、本地兜底的缓存
///
/// 远程错误在这里记录日志后吞掉，调用方只看到值、未命中，
/// 以及写入是否到达远程的 `bool`
pub struct TieredCache {
    remote: Option<Arc<dyn RemoteBackend>>,
    local: LocalStore,
    clock: Arc<dyn Clock>,
}

impl TieredCache {
    pub fn new(remote: Option<Arc<dyn RemoteBackend>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            remote,
            local: LocalStore::default(),
            clock,
        }
    }

    pub fn memory_only(clock: Arc<dyn Clock>) -> Self {
        Self::new(None, clock)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => tracing::warn!(key, error = %e, "Remote cache get failed, using memory"),
            }
        }
        self.local.get(key, self.clock.now())
    }

    /// 返回是否写入了远程缓存
    pub async fn set(&self, key: &str, value: String, ttl_secs: u64) -> bool {
        if let Some(remote) = &self.remote {
            match remote.set_ex(key, &value, ttl_secs).await {
                Ok(()) => {
                    self.local.remove(key);
                    return true;
                }
                Err(e) => tracing::warn!(key, error = %e, "Remote cache set failed, using memory"),
            }
        }
        self.local.set(key, value, ttl_secs, self.clock.now());
        false
    }

    pub async fn delete(&self, key: &str) {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.del(key).await {
                tracing::warn!(key, error = %e, "Remote cache delete failed");
            }
        }
        self.local.remove(key);
    }

    /// 读取后立即删除，同一个键最多返回一次
    pub async fn take(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.take(key).await {
                Ok(Some(value)) => {
                    self.local.remove(key);
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(key, error = %e, "Remote cache take failed, using memory"),
            }
        }
        self.local.take(key, self.clock.now())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        decode(key, &raw)
    }

    pub async fn take_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.take(key).await?;
        decode(key, &raw)
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, json, ttl_secs).await,
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to serialize cache value");
                false
            }
        }
    }

    /// 探测远程缓存，返回是否可用
    pub async fn ping_remote(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        match remote.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Remote cache ping failed");
                false
            }
        }
    }

    /// 清理本地过期条目
    pub fn sweep(&self) -> usize {
        self.local.sweep(self.clock.now())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            backend: self.remote.as_ref().map_or("memory", |remote| remote.name()),
            remote_connected: self.remote.as_ref().is_some_and(|remote| remote.is_connected()),
            local_entries: self.local.len(),
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache value");
            None
        }
    }
}
