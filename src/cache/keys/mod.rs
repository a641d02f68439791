/// 缓存键模块
/// 提供各种缓存键生成函数

// 桥接令牌与限流键
pub mod bridge_keys;

// 会话缓存键
pub mod session_keys;

pub use bridge_keys::{bridge_key, creation_key, redeem_failure_key};
pub use session_keys::session_key;
