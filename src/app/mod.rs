// ==========================================
// 仓库库存驾驶舱 - 应用层
// ==========================================
// 职责: 组件装配 + HTTP 路由（axum）
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::router;
pub use state::AppState;
