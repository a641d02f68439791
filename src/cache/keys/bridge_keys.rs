/// 桥接令牌缓存键前缀
const BRIDGE_PREFIX: &str = "bridge:";

/// 兑换失败计数键前缀
const REDEEM_FAILURE_PREFIX: &str = "redeem_failure:";

/// 创建计数键前缀
const CREATION_PREFIX: &str = "bridge_create:";

/// 参与失败计数的令牌前缀长度
const TOKEN_PREFIX_LEN: usize = 8;

/// 生成桥接令牌缓存键
pub fn bridge_key(token: &str) -> String {
    format!("{}{}", BRIDGE_PREFIX, token)
}

/// 生成创建限流键
pub fn creation_key(ip: &str) -> String {
    format!("{}{}", CREATION_PREFIX, ip)
}

/// 生成兑换失败计数键，按 IP + 令牌前缀区分
pub fn redeem_failure_key(ip: &str, token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_PREFIX_LEN).collect();
    format!("{}{}:{}", REDEEM_FAILURE_PREFIX, ip, prefix)
}
