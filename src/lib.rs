// ==========================================
// 仓库库存驾驶舱 - 核心库
// ==========================================
// 技术栈: Rust + axum + calamine
// 系统定位: 多表格源对账 + 驾驶舱指标（只读）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 文档仓储层 - 抓取 / 缓存 / 回退
pub mod repository;

// 引擎层 - 对账与指标
pub mod engine;

// 导入层 - 文档解析与字段映射
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 阶段耗时统计
pub mod perf;

// API 层 - 查询接口
pub mod api;

// 应用层 - 装配与 HTTP 路由
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ComparisonType, Period, RecordSource, SourceKind};

// 领域实体
pub use domain::{InventoryRecord, MovementRecord, ProductDescription, RegisteredPosition};

// 引擎
pub use engine::{
    MetricsEngine, PalletBalancer, PipelineOrchestrator, PipelineSnapshot, Reconciler,
};

// API
pub use api::DashboardApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库库存驾驶舱";
