#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use parking_lot::Mutex;
use serde_json::Value;
use session_bridge::{
    AppState, build_router,
    cache::{CacheError, RemoteBackend},
    clock::ManualClock,
    config::Config,
};
use tower::ServiceExt;

/// 多个实例共享的远程缓存替身，行为接近 Redis
#[derive(Default)]
pub struct SharedRemote {
    data: Mutex<HashMap<String, String>>,
}

impl SharedRemote {
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }
}

#[async_trait]
impl RemoteBackend for SharedRemote {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<(), CacheError> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.data.lock().remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.data.lock().remove(key))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// 永远不可用的远程缓存
pub struct DownRemote;

#[async_trait]
impl RemoteBackend for DownRemote {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_connected(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        Self::with_clock(remote, Arc::new(ManualClock::default()))
    }

    pub fn with_clock(remote: Option<Arc<dyn RemoteBackend>>, clock: Arc<ManualClock>) -> Self {
        Self::with_config(Config::default(), remote, clock)
    }

    pub fn with_config(
        config: Config,
        remote: Option<Arc<dyn RemoteBackend>>,
        clock: Arc<ManualClock>,
    ) -> Self {
        let state = AppState::new(config, remote, clock.clone());
        Self {
            router: build_router(state.clone()),
            clock,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, ip: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .header("x-real-ip", ip)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, ip: &str) -> (StatusCode, Value) {
        let request = Request::get(uri)
            .header("x-real-ip", ip)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn issue(&self, ip: &str) -> String {
        let (status, body) = self.post_json("/api/session-bridge", ip, sample_payload()).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
        body["bridgeToken"].as_str().unwrap().to_string()
    }

    pub async fn redeem(&self, ip: &str, token: &str) -> (StatusCode, Value) {
        self.get(&format!("/api/session-bridge?token={token}"), ip).await
    }
}

pub fn sample_payload() -> Value {
    serde_json::json!({
        "sessionToken": "abc",
        "userId": "u1",
        "tenantId": "t1",
        "email": "a@b.com"
    })
}
