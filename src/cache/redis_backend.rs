use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};

use super::backend::{CacheError, RemoteBackend};

/// Redis 远程缓存后端
pub struct RedisBackend {
    redis: Arc<RedisClient>,
    timeout: Duration,
    connected: AtomicBool,
}

impl RedisBackend {
    pub fn new(redis: RedisClient, timeout: Duration) -> Self {
        Self {
            redis: Arc::new(redis),
            timeout,
            connected: AtomicBool::new(false),
        }
    }

    /// 只校验 URL，不建立连接
    pub fn open(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        Ok(Self::new(RedisClient::open(url)?, timeout))
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.bounded(async {
            let conn = self.redis.get_multiplexed_async_connection().await?;
            Ok::<_, CacheError>(conn)
        })
        .await
    }

    /// 所有远程调用都受超时约束，并更新连接状态
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout.as_millis())),
        };
        self.connected.store(result.is_ok(), Ordering::Relaxed);
        result
    }
}

#[async_trait]
impl RemoteBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async { Ok::<_, CacheError>(conn.get(key).await?) }).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: () = conn.set_ex(key, value, ttl_secs).await?;
            Ok::<_, CacheError>(())
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: () = conn.del(key).await?;
            Ok::<_, CacheError>(())
        })
        .await
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        // GETDEL 保证同一个键只能被读取一次
        self.bounded(async { Ok::<_, CacheError>(conn.get_del(key).await?) }).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, CacheError>(())
        })
        .await
    }
}
