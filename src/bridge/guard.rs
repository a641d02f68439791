use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::keys::{creation_key, redeem_failure_key};
use crate::cache::models::RateCounter;
use crate::clock::Clock;

/// 令牌创建与兑换的限流器
///
/// 计数器只在本进程内有效，每个键从首次命中开始一个 `window_secs` 长的固定窗口
pub struct RateGuard {
    counters: Mutex<HashMap<String, RateCounter>>,
    clock: Arc<dyn Clock>,
    window_secs: u64,
    creation_limit: u32,
    failure_limit: u32,
}

/// 被拒绝时距离窗口重置的秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter(pub u64);

impl RateGuard {
    pub fn new(
        clock: Arc<dyn Clock>,
        window_secs: u64,
        creation_limit: u32,
        failure_limit: u32,
    ) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            clock,
            window_secs,
            creation_limit,
            failure_limit,
        }
    }

    /// 记录一次创建，超过上限时拒绝
    pub fn check_creation(&self, ip: &str) -> Result<(), RetryAfter> {
        let key = creation_key(ip);
        let now = self.clock.now();
        let mut counters = self.counters.lock();
        let counter = Self::live_counter(&mut counters, &key, now, self.window_secs);

        counter.count += 1;
        if counter.count > self.creation_limit {
            return Err(RetryAfter(counter.remaining_secs(now)));
        }
        Ok(())
    }

    /// 该 IP + 令牌前缀是否已被锁定
    pub fn is_locked_out(&self, ip: &str, token: &str) -> Option<RetryAfter> {
        let key = redeem_failure_key(ip, token);
        let now = self.clock.now();
        let counters = self.counters.lock();

        counters
            .get(&key)
            .filter(|counter| !counter.is_elapsed(now) && counter.count >= self.failure_limit)
            .map(|counter| RetryAfter(counter.remaining_secs(now)))
    }

    /// 记录一次兑换失败，返回当前窗口内的失败次数
    pub fn record_failure(&self, ip: &str, token: &str) -> u32 {
        let key = redeem_failure_key(ip, token);
        let now = self.clock.now();
        let mut counters = self.counters.lock();
        let counter = Self::live_counter(&mut counters, &key, now, self.window_secs);

        counter.count += 1;
        counter.count
    }

    /// 删除已过窗口的计数器
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut counters = self.counters.lock();
        let before = counters.len();
        counters.retain(|_, counter| !counter.is_elapsed(now));
        before - counters.len()
    }

    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }

    fn live_counter<'a>(
        counters: &'a mut HashMap<String, RateCounter>,
        key: &str,
        now: chrono::DateTime<chrono::Utc>,
        window_secs: u64,
    ) -> &'a mut RateCounter {
        let counter = counters
            .entry(key.to_string())
            .or_insert_with(|| RateCounter::new(now, window_secs));
        if counter.is_elapsed(now) {
            *counter = RateCounter::new(now, window_secs);
        }
        counter
    }
}
