//! 会话桥接：签发一次性令牌，并在短时间内兑换回会话数据

pub mod guard;

use std::sync::Arc;

use crate::cache::TieredCache;
use crate::cache::keys::bridge_key;
use crate::cache::models::{BridgeRecord, SessionPayload};
use crate::clock::Clock;
use crate::utils::{generate_bridge_token, token_fingerprint};

pub use guard::{RateGuard, RetryAfter};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("too many bridge tokens created, retry in {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },
    #[error("bridge token is invalid or expired")]
    InvalidOrExpiredToken,
    #[error("too many failed redemption attempts, retry in {retry_after}s")]
    TooManyFailedAttempts { retry_after: u64 },
}

#[derive(Debug, Clone)]
pub struct IssuedBridge {
    pub token: String,
    pub expires_in_seconds: u64,
    /// 记录是否写入了远程缓存
    pub stored_remotely: bool,
}

pub struct SessionBridge {
    cache: Arc<TieredCache>,
    guard: Arc<RateGuard>,
    clock: Arc<dyn Clock>,
    ttl_secs: u64,
}

impl SessionBridge {
    pub fn new(
        cache: Arc<TieredCache>,
        guard: Arc<RateGuard>,
        clock: Arc<dyn Clock>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            cache,
            guard,
            clock,
            ttl_secs,
        }
    }

    /// 签发桥接令牌
    pub async fn issue(
        &self,
        ip: &str,
        payload: SessionPayload,
    ) -> Result<IssuedBridge, BridgeError> {
        if payload.user_id.trim().is_empty() {
            return Err(BridgeError::MissingField("userId"));
        }
        if payload.session_token.trim().is_empty() {
            return Err(BridgeError::MissingField("sessionToken"));
        }

        if let Err(RetryAfter(retry_after)) = self.guard.check_creation(ip) {
            tracing::warn!(ip, "Bridge token creation rate limit exceeded");
            return Err(BridgeError::RateLimitExceeded { retry_after });
        }

        let token = generate_bridge_token();
        let record = BridgeRecord::new(token.clone(), payload, self.clock.now(), self.ttl_secs);
        let stored_remotely = self
            .cache
            .set_json(&bridge_key(&token), &record, self.ttl_secs)
            .await;

        tracing::info!(
            ip,
            token = %token_fingerprint(&token),
            user_id = %record.payload.user_id,
            stored_remotely,
            "Issued session bridge token"
        );

        Ok(IssuedBridge {
            token,
            expires_in_seconds: self.ttl_secs,
            stored_remotely,
        })
    }

    /// 兑换桥接令牌，成功后令牌立即失效
    pub async fn redeem(&self, ip: &str, token: &str) -> Result<SessionPayload, BridgeError> {
        let fingerprint = token_fingerprint(token);

        // 锁定检查在读取缓存之前，避免消耗有效令牌
        if let Some(RetryAfter(retry_after)) = self.guard.is_locked_out(ip, token) {
            tracing::warn!(ip, token = %fingerprint, "Bridge redemption locked out");
            return Err(BridgeError::TooManyFailedAttempts { retry_after });
        }

        let record = self
            .cache
            .take_json::<BridgeRecord>(&bridge_key(token))
            .await
            .filter(|record| !record.is_expired(self.clock.now()) && record.token == token);

        match record {
            Some(record) => {
                tracing::info!(
                    ip,
                    token = %fingerprint,
                    user_id = %record.payload.user_id,
                    email = record.payload.email.as_deref().unwrap_or("-"),
                    "Redeemed session bridge token"
                );
                Ok(record.payload)
            }
            None => {
                let failures = self.guard.record_failure(ip, token);
                tracing::warn!(
                    ip,
                    token = %fingerprint,
                    failures,
                    "Invalid or expired bridge token"
                );
                Err(BridgeError::InvalidOrExpiredToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::clock::ManualClock;

    fn payload() -> SessionPayload {
        SessionPayload {
            session_token: "abc".into(),
            user_id: "u1".into(),
            tenant_id: Some("t1".into()),
            email: Some("a@b.com".into()),
        }
    }

    fn bridge() -> (Arc<ManualClock>, SessionBridge) {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(TieredCache::memory_only(clock.clone()));
        let guard = Arc::new(RateGuard::new(clock.clone(), 300, 10, 3));
        (clock.clone(), SessionBridge::new(cache, guard, clock, 60))
    }

    #[tokio::test]
    async fn round_trip_returns_original_payload() {
        let (_clock, bridge) = bridge();

        let issued = bridge.issue("ip", payload()).await.unwrap();
        assert_eq!(issued.token.len(), 64);
        assert_eq!(issued.expires_in_seconds, 60);
        assert!(!issued.stored_remotely);

        assert_eq!(bridge.redeem("ip", &issued.token).await.unwrap(), payload());
    }

    #[tokio::test]
    async fn second_redemption_is_rejected() {
        let (_clock, bridge) = bridge();
        let issued = bridge.issue("ip", payload()).await.unwrap();

        assert!(bridge.redeem("ip", &issued.token).await.is_ok());
        assert_eq!(
            bridge.redeem("ip", &issued.token).await,
            Err(BridgeError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn token_expires_after_ttl() {
        let (clock, bridge) = bridge();
        let issued = bridge.issue("ip", payload()).await.unwrap();

        clock.advance(Duration::seconds(61));
        assert_eq!(
            bridge.redeem("ip", &issued.token).await,
            Err(BridgeError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn blank_subject_is_rejected_before_rate_counting() {
        let (_clock, bridge) = bridge();
        let mut bad = payload();
        bad.user_id = "  ".into();

        assert_eq!(
            bridge.issue("ip", bad).await.unwrap_err(),
            BridgeError::MissingField("userId")
        );

        let mut bad = payload();
        bad.session_token = String::new();
        assert_eq!(
            bridge.issue("ip", bad).await.unwrap_err(),
            BridgeError::MissingField("sessionToken")
        );
        assert!(bridge.guard.is_empty());
    }

    #[tokio::test]
    async fn creation_rate_limit_applies_per_ip() {
        let (_clock, bridge) = bridge();

        for _ in 0..10 {
            bridge.issue("ip", payload()).await.unwrap();
        }
        assert!(matches!(
            bridge.issue("ip", payload()).await,
            Err(BridgeError::RateLimitExceeded { .. })
        ));
        assert!(bridge.issue("other", payload()).await.is_ok());
    }

    #[tokio::test]
    async fn lockout_does_not_consume_valid_record() {
        let (clock, bridge) = bridge();
        let issued = bridge.issue("ip", payload()).await.unwrap();
        // 同一前缀、不同后缀的伪造令牌
        let forged = format!("{}{}", &issued.token[..8], "0".repeat(56));

        for _ in 0..3 {
            assert_eq!(
                bridge.redeem("ip", &forged).await,
                Err(BridgeError::InvalidOrExpiredToken)
            );
        }
        assert!(matches!(
            bridge.redeem("ip", &issued.token).await,
            Err(BridgeError::TooManyFailedAttempts { .. })
        ));

        // 另一 IP 仍可兑换，说明记录未被消耗
        clock.advance(Duration::seconds(10));
        assert_eq!(bridge.redeem("ip2", &issued.token).await.unwrap(), payload());
    }
}
