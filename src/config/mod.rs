// ==========================================
// 仓库库存驾驶舱 - 配置层
// ==========================================
// 职责: 系统配置管理，支持多级覆写
// 来源: 默认值 / JSON 配置文件 / 环境变量
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, is_true, AppConfig, ConfigError, ConfigManager, ConfigResult, DamageKeywords,
    SourceConfig,
};
