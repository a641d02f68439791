/// 缓存数据模型
/// 定义缓存数据的结构体
pub mod bridge;
pub mod rate_limit;
pub mod session;

// 重新导出常用类型
pub use bridge::{BridgeRecord, SessionPayload};
pub use rate_limit::RateCounter;
pub use session::CachedSession;

/// 计算过期时间戳，超大 TTL 饱和到 `i64::MAX` 而不是溢出
pub fn expiry_timestamp(now: i64, ttl_secs: u64) -> i64 {
    now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
}
