use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expiry_timestamp;

/// 桥接的会话数据，`user_id` 为主体标识
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub session_token: String,
    pub user_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 桥接令牌缓存模型
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BridgeRecord {
    pub token: String,
    pub payload: SessionPayload,
    pub created_at: i64, // Unix timestamp
    pub expires_at: i64, // Unix timestamp
}

impl BridgeRecord {
    pub fn new(token: String, payload: SessionPayload, now: DateTime<Utc>, ttl_secs: u64) -> Self {
        let created_at = now.timestamp();
        Self {
            token,
            payload,
            created_at,
            expires_at: expiry_timestamp(created_at, ttl_secs),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SessionPayload {
        SessionPayload {
            session_token: "abc".into(),
            user_id: "u1".into(),
            tenant_id: Some("t1".into()),
            email: Some("a@b.com".into()),
        }
    }

    #[test]
    fn record_expires_exactly_at_ttl() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let record = BridgeRecord::new("tok".into(), payload(), now, 60);

        assert_eq!(record.expires_at - record.created_at, 60);
        assert!(!record.is_expired(now + chrono::Duration::seconds(59)));
        assert!(record.is_expired(now + chrono::Duration::seconds(60)));
    }

    #[test]
    fn oversized_ttl_never_expires_in_the_past() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let record = BridgeRecord::new("tok".into(), payload(), now, u64::MAX);

        assert_eq!(record.expires_at, i64::MAX);
        assert!(!record.is_expired(now));
    }

    #[test]
    fn payload_uses_camel_case_and_optional_fields() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["sessionToken"], "abc");
        assert_eq!(json["tenantId"], "t1");

        let minimal: SessionPayload =
            serde_json::from_str(r#"{"sessionToken":"s","userId":"u"}"#).unwrap();
        assert_eq!(minimal.tenant_id, None);
        assert_eq!(minimal.email, None);
    }
}
