use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use session_bridge::{
    AppState, build_router,
    cache::{RedisBackend, RemoteBackend},
    clock::SystemClock,
    config::Config,
    sweeper::Sweeper,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置 Redis 后端，失败时退回内存模式
    let remote = connect_remote(&config).await;

    let state = AppState::new(config.clone(), remote, Arc::new(SystemClock));

    // 启动定期清理任务
    let sweeper = Sweeper::spawn(
        state.cache.clone(),
        state.guard.clone(),
        config.sweep_interval(),
    );

    let app = build_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    sweeper.shutdown().await;
    tracing::info!("Server stopped");
}

async fn connect_remote(config: &Config) -> Option<Arc<dyn RemoteBackend>> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::warn!("REDIS_URL not set, running with in-memory cache only");
        return None;
    };

    let backend = match RedisBackend::open(url, config.remote_timeout()) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Invalid REDIS_URL, running with in-memory cache only");
            return None;
        }
    };

    // 启动时不可达也保留后端，之后的请求会继续尝试
    match backend.ping().await {
        Ok(()) => tracing::info!("Connected to Redis"),
        Err(e) => tracing::warn!(error = %e, "Redis unreachable at startup, degrading to memory"),
    }

    Some(Arc::new(backend))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
