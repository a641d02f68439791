use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Get,
    Set,
    Delete,
}

impl SessionAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "set" => Some(Self::Set),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

// 会话缓存请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCacheRequest {
    pub action: Option<String>,
    pub session_id: Option<String>,
    pub session_data: Option<serde_json::Value>,
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GetSessionResponse {
    pub found: bool,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SetSessionResponse {
    pub stored: bool,
    pub remote: bool,
    pub ttl: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub deleted: bool,
}

// 缓存状态响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatusResponse {
    pub backend: &'static str,
    pub connected: bool,
    pub memory_cache_size: usize,
    pub timestamp: i64,
}
