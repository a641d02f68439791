use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::models::expiry_timestamp;

#[derive(Debug, Clone)]
struct LocalEntry {
    value: String,
    expires_at: i64, // Unix timestamp
}

impl LocalEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.expires_at
    }
}

/// 进程内缓存，远程不可用时作为兜底
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: RwLock<HashMap<String, LocalEntry>>,
}

impl LocalStore {
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: &str, value: String, ttl_secs: u64, now: DateTime<Utc>) {
        let entry = LocalEntry {
            value,
            expires_at: expiry_timestamp(now.timestamp(), ttl_secs),
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// 取出并删除；过期条目同样被删除但不返回
    pub fn take(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        self.entries
            .write()
            .remove(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// 删除过期条目，返回删除数量
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
