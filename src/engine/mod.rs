// ==========================================
// 仓库库存驾驶舱 - 引擎层
// ==========================================
// 职责: 对账 / 托盘平衡 / 指标计算 / 管道编排
// 红线: 引擎不做 I/O（编排器除外），输入输出均为固定字段记录
// ==========================================

pub mod comparison;
pub mod divergence;
pub mod error;
pub mod metrics;
pub mod movement_window;
pub mod orchestrator;
pub mod pallet_balancer;
pub mod reconciler;

// 重导出核心引擎
pub use comparison::{compare, ComparisonReport, ComparisonRow};
pub use divergence::{detect_divergences, Divergence};
pub use error::{PipelineError, PipelineResult};
pub use metrics::{occupancy_pct, InventoryStats, MetricsEngine};
pub use movement_window::{MovementTotals, MovementWindow};
pub use orchestrator::{assemble, LoadedSources, PipelineOrchestrator, PipelineSnapshot};
pub use pallet_balancer::PalletBalancer;
pub use reconciler::Reconciler;
