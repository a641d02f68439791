mod handler;
mod model;

pub use handler::{cache_status, session_cache};
pub use model::{SessionAction, SessionCacheRequest};
