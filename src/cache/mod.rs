// 缓存模块
// 远程（Redis）优先，进程内存兜底

pub mod backend;
pub mod keys;
pub mod memory;
pub mod models;
pub mod operations;
pub mod redis_backend;
pub mod tiered;

// 重新导出常用类型和函数，方便其他模块使用
pub use backend::{CacheError, RemoteBackend};
pub use memory::LocalStore;
pub use models::{BridgeRecord, CachedSession, RateCounter, SessionPayload};
pub use operations::SessionCacheOperations;
pub use redis_backend::RedisBackend;
pub use tiered::{CacheStats, TieredCache};
