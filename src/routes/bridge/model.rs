use serde::{Deserialize, Serialize};

use crate::cache::models::SessionPayload;

// 创建桥接令牌请求，字段缺失时返回 400 而不是 422
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBridgeRequest {
    pub session_token: Option<String>,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub email: Option<String>,
}

impl CreateBridgeRequest {
    /// 校验必填字段并转换为会话数据
    pub fn into_payload(self) -> Result<SessionPayload, Vec<&'static str>> {
        let mut missing = Vec::new();
        let session_token = non_blank(self.session_token);
        let user_id = non_blank(self.user_id);

        if session_token.is_none() {
            missing.push("sessionToken");
        }
        if user_id.is_none() {
            missing.push("userId");
        }

        match (session_token, user_id) {
            (Some(session_token), Some(user_id)) => Ok(SessionPayload {
                session_token,
                user_id,
                tenant_id: non_blank(self.tenant_id),
                email: non_blank(self.email),
            }),
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBridgeResponse {
    pub bridge_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct RedeemBridgeQuery {
    pub token: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
