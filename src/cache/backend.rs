use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("remote cache timed out after {0}ms")]
    Timeout(u128),
    #[error("remote cache unavailable: {0}")]
    Unavailable(String),
}

/// 远程缓存后端（Redis 或测试替身）
///
/// 实现只负责返回 [`CacheError`]，如何降级由分层缓存决定
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// 最近一次请求是否成功
    fn is_connected(&self) -> bool;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// 读取并删除，Redis 下为原子操作
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.del(key).await?;
        }
        Ok(value)
    }

    async fn ping(&self) -> Result<(), CacheError>;
}
