use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::config::Config;

/// 请求方 IP，用于限流计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 信任代理头时优先使用代理头，其次连接信息
    ///
    /// 代理头可被客户端任意伪造，直接对外暴露时应关闭 `trust_proxy_headers`，
    /// 否则轮换请求头即可绕过按 IP 的限流
    pub fn resolve(
        headers: &HeaderMap,
        remote: Option<SocketAddr>,
        trust_proxy_headers: bool,
    ) -> Self {
        let remote_ip = remote.map(|addr| addr.ip().to_string());
        let headers = trust_proxy_headers.then_some(headers);

        let ip = headers
            .and_then(|h| h.get("x-real-ip"))
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                headers
                    .and_then(|h| h.get("x-forwarded-for"))
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
            .or(remote_ip.as_deref()) // 降级使用连接IP
            .unwrap_or("unknown")
            .trim()
            .to_string();

        ClientIp(ip)
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);

        Ok(Self::resolve(&parts.headers, remote, config.trust_proxy_headers))
    }
}
