// ==========================================
// 仓库库存驾驶舱 - API 层
// ==========================================
// 职责: 提供只读查询接口，供 HTTP 路由调用
// ==========================================

pub mod dashboard_api;
pub mod dto;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{build_stats, DashboardApi};
pub use dto::{HealthResponse, MovementEntry, StatsResponse};
pub use error::{ApiError, ApiResult, ErrorBody};
