//! 班次翻转调度器
//!
//! 启动时清理一次，之后在每个营业日 cutoff 时间点清理过期的桌台分配
//! (shift date < 当前营业日)。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::engine::FloorEngine;
use crate::utils::time;

/// Upper bound on one sleep, so a clock jump is noticed within the hour
const MAX_SLEEP: std::time::Duration = std::time::Duration::from_secs(3600);

/// 班次翻转调度器
///
/// 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
pub struct ShiftRolloverScheduler {
    engine: Arc<FloorEngine>,
    shutdown: CancellationToken,
}

impl ShiftRolloverScheduler {
    pub fn new(engine: Arc<FloorEngine>, shutdown: CancellationToken) -> Self {
        Self { engine, shutdown }
    }

    /// 主循环：启动清理 + cutoff 定点触发
    pub async fn run(self) {
        tracing::info!("Shift rollover scheduler started");

        self.rollover();

        loop {
            let clock = *self.engine.clock();
            let sleep_duration =
                time::duration_until_next_cutoff(chrono::Utc::now(), clock.cutoff(), clock.timezone())
                    .min(MAX_SLEEP);

            tracing::debug!(
                "Next rollover check in {} minutes (cutoff={})",
                sleep_duration.as_secs() / 60,
                clock.cutoff().format("%H:%M")
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.rollover();
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Shift rollover scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    fn rollover(&self) {
        match self.engine.purge_expired() {
            Ok(0) => tracing::debug!("No expired assignments"),
            Ok(count) => tracing::info!(count, "Shift rollover removed expired assignments"),
            Err(e) => tracing::error!("Shift rollover failed: {}", e),
        }
    }
}
