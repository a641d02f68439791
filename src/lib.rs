use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::post};
use tower::ServiceBuilder;

use bridge::{RateGuard, SessionBridge};
use cache::{RemoteBackend, TieredCache};
use clock::Clock;
use config::Config;

pub mod bridge;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sweeper;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub cache: Arc<TieredCache>,
    pub guard: Arc<RateGuard>,
    pub bridge: Arc<SessionBridge>,
}

impl AppState {
    /// 组装缓存、限流器和桥接服务；`remote` 为空时只使用进程内存
    pub fn new(
        config: Config,
        remote: Option<Arc<dyn RemoteBackend>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(TieredCache::new(remote, clock.clone()));
        let guard = Arc::new(RateGuard::new(
            clock.clone(),
            config.rate_limit_window_secs,
            config.creation_limit,
            config.redemption_failure_limit,
        ));
        let bridge = Arc::new(SessionBridge::new(
            cache.clone(),
            guard.clone(),
            clock.clone(),
            config.bridge_ttl().as_secs(),
        ));

        Self {
            config: Arc::new(config),
            clock,
            cache,
            guard,
            bridge,
        }
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/session-bridge",
            post(routes::bridge::create_bridge).get(routes::bridge::redeem_bridge),
        )
        .route(
            "/cache/session",
            post(routes::session::session_cache).get(routes::session::cache_status),
        );

    // axum 不允许在根路径 nest
    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(base, api)
    };

    let router = router.layer(
        ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::log_errors)),
    );

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
