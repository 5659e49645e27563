use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const DEFAULT_SLOW_STAGE_MS: u64 = 500;

static SLOW_STAGE_THRESHOLD_MS: AtomicU64 = AtomicU64::new(DEFAULT_SLOW_STAGE_MS);

/// 读取慢阶段阈值
///
/// 开关：
/// - `AVARIAS_SLOW_STAGE_MS=800` 配置慢阶段阈值（毫秒）；0 关闭慢阶段告警
pub fn install_slow_stage_threshold() {
    let slow_ms = std::env::var(crate::config::config_keys::SLOW_STAGE_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_SLOW_STAGE_MS);
    set_slow_stage_threshold_ms(slow_ms);
}

pub fn set_slow_stage_threshold_ms(ms: u64) {
    SLOW_STAGE_THRESHOLD_MS.store(ms, Ordering::Relaxed);
}

pub fn slow_stage_threshold_ms() -> u64 {
    SLOW_STAGE_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 性能统计 Guard：记录管道阶段 elapsed_ms，超阈值时告警
///
/// 使用方式：
/// ```ignore
/// let _perf = avarias_dashboard::perf::PerfGuard::new("reconcile");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        tracing::debug!(target: "perf", op = self.op, elapsed_ms, "done");

        let threshold = slow_stage_threshold_ms();
        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(
                target: "slow_stage",
                op = self.op,
                elapsed_ms,
                threshold_ms = threshold,
                "slow stage"
            );
        }
    }
}
