use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::bridge::RateGuard;
use crate::cache::TieredCache;

/// 定期清理本地缓存与过期限流计数器的后台任务
pub struct Sweeper;

/// 后台任务句柄，关闭时需要 await
pub struct SweeperHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// 执行一次清理，返回删除的 `(缓存条目, 计数器)` 数量
    pub fn sweep_once(cache: &TieredCache, guard: &RateGuard) -> (usize, usize) {
        let entries = cache.sweep();
        let counters = guard.sweep();

        if entries > 0 || counters > 0 {
            info!(entries, counters, "Swept expired cache entries and rate counters");
        } else {
            debug!("Sweep found nothing to remove");
        }

        (entries, counters)
    }

    pub fn spawn(cache: Arc<TieredCache>, guard: Arc<RateGuard>, period: Duration) -> SweeperHandle {
        let (stop, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即返回，跳过
            ticker.tick().await;

            info!(period_secs = period.as_secs(), "Cache sweeper started");

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        Self::sweep_once(&cache, &guard);
                    }
                }
            }

            info!("Cache sweeper stopped");
        });

        SweeperHandle { stop, task }
    }
}

impl SweeperHandle {
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache sweeper task failed");
        }
    }
}
