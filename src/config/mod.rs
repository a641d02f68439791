use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 缓存 TTL 上限（一年），客户端传入的 ttl 也受此限制
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub bridge_ttl_secs: u64,
    pub creation_limit: u32,
    pub redemption_failure_limit: u32,
    pub rate_limit_window_secs: u64,
    pub sweep_interval_secs: u64,
    pub session_ttl_secs: u64,
    pub remote_timeout_ms: u64,
    /// 是否信任 x-real-ip / x-forwarded-for，只应在反向代理之后开启
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            bridge_ttl_secs: 60,
            creation_limit: 10,
            redemption_failure_limit: 3,
            rate_limit_window_secs: 300,
            sweep_interval_secs: 300,
            session_ttl_secs: 86_400,
            remote_timeout_ms: 500,
            trust_proxy_headers: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        Ok(Config {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            api_base_uri: env::var("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            bridge_ttl_secs: parse_bounded("BRIDGE_TTL", defaults.bridge_ttl_secs, MAX_TTL_SECS)?,
            creation_limit: parse_var("BRIDGE_CREATION_LIMIT", defaults.creation_limit)?,
            redemption_failure_limit: parse_var(
                "BRIDGE_REDEEM_FAILURE_LIMIT",
                defaults.redemption_failure_limit,
            )?,
            rate_limit_window_secs: parse_bounded(
                "RATE_LIMIT_WINDOW",
                defaults.rate_limit_window_secs,
                MAX_TTL_SECS,
            )?,
            sweep_interval_secs: parse_bounded(
                "CACHE_SWEEP_INTERVAL",
                defaults.sweep_interval_secs,
                MAX_TTL_SECS,
            )?,
            session_ttl_secs: parse_bounded(
                "SESSION_CACHE_TTL",
                defaults.session_ttl_secs,
                MAX_TTL_SECS,
            )?,
            remote_timeout_ms: parse_bounded(
                "REMOTE_CACHE_TIMEOUT_MS",
                defaults.remote_timeout_ms,
                u64::MAX,
            )?,
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
        })
    }

    pub fn bridge_ttl(&self) -> Duration {
        Duration::from_secs(self.bridge_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

/// 解析必须大于零且不超过 `max` 的数值
fn parse_bounded(name: &'static str, default: u64, max: u64) -> Result<u64, ConfigError> {
    let value = parse_var(name, default)?;
    ensure_in_range(name, value, max)
}

// interval(0) 会 panic，TTL 为 0 时 Redis 也会拒绝 SET EX
fn ensure_in_range(name: &'static str, value: u64, max: u64) -> Result<u64, ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    // 兼容 "60s" 这种写法
    raw.trim()
        .trim_end_matches('s')
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bridge_contract() {
        let config = Config::default();

        assert_eq!(config.bridge_ttl(), Duration::from_secs(60));
        assert_eq!(config.creation_limit, 10);
        assert_eq!(config.redemption_failure_limit, 3);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(300));
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn parses_plain_and_suffixed_seconds() {
        assert_eq!(parse_value::<u64>("BRIDGE_TTL", "90").unwrap(), 90);
        assert_eq!(parse_value::<u64>("BRIDGE_TTL", " 45s ").unwrap(), 45);
    }

    #[test]
    fn rejects_garbage_with_variable_name() {
        let err = parse_value::<u16>("SERVER_PORT", "eighty").unwrap_err();

        assert_eq!(err.to_string(), "invalid value \"eighty\" for SERVER_PORT");
    }

    #[test]
    fn rejects_zero_and_oversized_durations() {
        let zero = parse_value::<u64>("CACHE_SWEEP_INTERVAL", "0s")
            .and_then(|value| ensure_in_range("CACHE_SWEEP_INTERVAL", value, MAX_TTL_SECS))
            .unwrap_err();
        assert_eq!(zero.to_string(), "invalid value \"0\" for CACHE_SWEEP_INTERVAL");

        assert!(ensure_in_range("REMOTE_CACHE_TIMEOUT_MS", 0, u64::MAX).is_err());
        assert!(ensure_in_range("BRIDGE_TTL", MAX_TTL_SECS + 1, MAX_TTL_SECS).is_err());
        assert_eq!(ensure_in_range("BRIDGE_TTL", 60, MAX_TTL_SECS).unwrap(), 60);
    }

    #[test]
    fn defaults_pass_range_checks() {
        let config = Config::default();

        for (name, value) in [
            ("BRIDGE_TTL", config.bridge_ttl_secs),
            ("RATE_LIMIT_WINDOW", config.rate_limit_window_secs),
            ("CACHE_SWEEP_INTERVAL", config.sweep_interval_secs),
            ("SESSION_CACHE_TTL", config.session_ttl_secs),
        ] {
            assert!(ensure_in_range(name, value, MAX_TTL_SECS).is_ok(), "{name}");
        }
        assert!(config.trust_proxy_headers);
    }
}
