// ==========================================
// 仓库库存驾驶舱 - 驾驶舱 API
// ==========================================
// 职责: 三个只读查询（明细 / 统计 / 对比），每次请求重新执行管道
// 架构: HTTP 层 → DashboardApi → PipelineOrchestrator
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::instrument;

use crate::api::dto::{MovementEntry, StatsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::inventory::InventoryRecord;
use crate::domain::types::{ComparisonType, Period};
use crate::engine::movement_window::{frequency_maps, latest, MovementTotals, MovementWindow};
use crate::engine::{compare, detect_divergences, ComparisonReport, MetricsEngine};
use crate::engine::{PipelineOrchestrator, PipelineSnapshot};

/// 周期内流水展示上限
pub const TOP_MOVED_LIMIT: usize = 100;

/// 最近流水条数（不受周期影响）
pub const LATEST_MOVEMENTS: usize = 5;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    orchestrator: Arc<PipelineOrchestrator>,
    count_undated_in_periods: bool,
}

impl DashboardApi {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>) -> Self {
        let count_undated_in_periods = orchestrator.config().count_undated_in_periods;
        Self {
            orchestrator,
            count_undated_in_periods,
        }
    }

    /// 服务器本地日期
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ==========================================
    // 参数解析
    // ==========================================

    /// 统计周期，缺省为 recent
    pub fn parse_period(raw: Option<&str>) -> ApiResult<Period> {
        raw.unwrap_or("")
            .parse::<Period>()
            .map_err(ApiError::InvalidInput)
    }

    /// 对比类型，缺省为 fisico_x_a501
    pub fn parse_comparison(raw: Option<&str>) -> ApiResult<ComparisonType> {
        raw.unwrap_or("")
            .parse::<ComparisonType>()
            .map_err(ApiError::InvalidInput)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// GET /api/data
    pub async fn data(&self, today: NaiveDate) -> ApiResult<Vec<InventoryRecord>> {
        let snapshot = self.orchestrator.run(today).await?;
        Ok(snapshot.records)
    }

    /// GET /api/stats
    #[instrument(skip(self))]
    pub async fn stats(&self, period: Period, today: NaiveDate) -> ApiResult<StatsResponse> {
        let snapshot = self.orchestrator.run(today).await?;
        Ok(build_stats(&snapshot, period, self.count_undated_in_periods))
    }

    /// GET /api/confrontos
    #[instrument(skip(self))]
    pub async fn comparisons(
        &self,
        comparison: ComparisonType,
        today: NaiveDate,
    ) -> ApiResult<ComparisonReport> {
        let snapshot = self.orchestrator.run(today).await?;
        Ok(compare(
            comparison,
            &snapshot.records,
            &snapshot.descriptions,
            &snapshot.description_index(),
        ))
    }
}

/// 由管道快照构造统计响应
///
/// # 口径
/// - period_movements / top_moved / 频次: 周期窗口内
/// - cumulative_movements / 差异: 全部流水
/// - latest_movements: 全部流水中最近 5 条
pub fn build_stats(snapshot: &PipelineSnapshot, period: Period, count_undated: bool) -> StatsResponse {
    let window = MovementWindow::new(snapshot.today, count_undated);
    let in_period = window.select(period, &snapshot.movements);
    let (entry_frequency, exit_frequency) = frequency_maps(in_period.iter().copied());

    StatsResponse {
        period,
        reference_date: snapshot.today,
        inventory: MetricsEngine::new().inventory_stats(&snapshot.records),
        period_movements: MovementTotals::of(in_period.iter().copied()),
        cumulative_movements: MovementTotals::of(&snapshot.movements),
        top_moved: in_period
            .iter()
            .take(TOP_MOVED_LIMIT)
            .map(|m| MovementEntry::from(*m))
            .collect(),
        latest_movements: latest(&snapshot.movements, LATEST_MOVEMENTS)
            .into_iter()
            .map(MovementEntry::from)
            .collect(),
        entry_frequency,
        exit_frequency,
        divergences: detect_divergences(
            &snapshot.records,
            &snapshot.movements,
            &snapshot.description_index(),
        ),
        degraded_sources: snapshot.degraded_sources.clone(),
    }
}
