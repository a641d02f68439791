use crate::cache::keys::session_key;
use crate::cache::models::{expiry_timestamp, session::CachedSession};
use crate::cache::tiered::TieredCache;
use crate::clock::Clock;

/// 会话缓存操作
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 缓存会话，返回是否写入了远程缓存
    pub async fn cache_session(
        cache: &TieredCache,
        clock: &dyn Clock,
        session_id: &str,
        data: serde_json::Value,
        ttl: u64,
    ) -> bool {
        let now = clock.now().timestamp();

        let cached_session = CachedSession {
            session_id: session_id.to_string(),
            data,
            created_at: now,
            expires_at: expiry_timestamp(now, ttl),
        };

        cache
            .set_json(&session_key(session_id), &cached_session, ttl)
            .await
    }

    /// 获取会话
    pub async fn get_session(cache: &TieredCache, session_id: &str) -> Option<CachedSession> {
        cache.get_json(&session_key(session_id)).await
    }

    /// 删除会话
    pub async fn remove_session(cache: &TieredCache, session_id: &str) {
        cache.delete(&session_key(session_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn session_lifecycle_in_memory_mode() {
        let clock = Arc::new(ManualClock::default());
        let cache = TieredCache::memory_only(clock.clone());

        let remote = SessionCacheOperations::cache_session(
            &cache,
            clock.as_ref(),
            "sess-1",
            json!({ "userId": "u1", "roles": ["owner"] }),
            120,
        )
        .await;
        assert!(!remote);

        let session = SessionCacheOperations::get_session(&cache, "sess-1")
            .await
            .expect("session should be cached");
        assert_eq!(session.data["roles"][0], "owner");
        assert_eq!(session.expires_at - session.created_at, 120);

        SessionCacheOperations::remove_session(&cache, "sess-1").await;
        assert!(SessionCacheOperations::get_session(&cache, "sess-1").await.is_none());
    }

    #[tokio::test]
    async fn session_expires_with_ttl() {
        let clock = Arc::new(ManualClock::default());
        let cache = TieredCache::memory_only(clock.clone());

        SessionCacheOperations::cache_session(&cache, clock.as_ref(), "s", json!({}), 30).await;
        clock.advance(chrono::Duration::seconds(30));

        assert!(SessionCacheOperations::get_session(&cache, "s").await.is_none());
    }
}
