use axum::{Json, http::StatusCode};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// 桥接令牌的随机字节数
pub const TOKEN_BYTES: usize = 32;

/// 生成 64 位十六进制的随机令牌
pub fn generate_bridge_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// 日志中用令牌摘要代替原文
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

// 统一成功响应结构，业务字段平铺在 success 旁边
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub fn success_to_api_response<T: Serialize>(
    status: StatusCode,
    data: T,
) -> (StatusCode, Json<ApiSuccess<T>>) {
    (status, Json(ApiSuccess { success: true, data }))
}

pub mod error_codes {
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const INVALID_TOKEN: i32 = 1002;
    pub const RATE_LIMIT: i32 = 1005;
    pub const TOO_MANY_ATTEMPTS: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
}
