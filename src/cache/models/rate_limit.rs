use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expiry_timestamp;

/// 速率限制计数器，窗口从首次命中开始
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateCounter {
    pub count: u32,
    pub reset_at: i64, // Unix timestamp
}

impl RateCounter {
    pub fn new(now: DateTime<Utc>, window_secs: u64) -> Self {
        Self {
            count: 0,
            reset_at: expiry_timestamp(now.timestamp(), window_secs),
        }
    }

    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.reset_at
    }

    /// 距离窗口重置的剩余秒数
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.reset_at.saturating_sub(now.timestamp()).max(0) as u64
    }
}
