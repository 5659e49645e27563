// ==========================================
// 仓库库存驾驶舱 - 配置管理器
// ==========================================
// 职责: 配置加载与查询
// 层级: 默认值 ← JSON 配置文件（AVARIAS_CONFIG）← 环境变量
// ==========================================

use crate::domain::types::SourceKind;
use crate::repository::DocumentLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_POSITION_PREFIX: &str = "G300";
const MIN_FETCH_TIMEOUT_SECS: u64 = 1;
const MAX_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 (path={path}): {message}")]
    FileRead { path: String, message: String },

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 布尔配置值：1 / true / yes / y / on
pub fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

// ==========================================
// SourceConfig - 单个数据源
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
}

/// 损坏关键词词干（为空 → 使用内置词干）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageKeywords {
    pub wet: Vec<String>,
    pub tipped: Vec<String>,
}

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub workbook_url: Option<String>,
    pub workbook_path: Option<PathBuf>,
    pub sources: BTreeMap<SourceKind, SourceConfig>,
    pub fetch_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub position_prefix: String,
    pub count_undated_in_periods: bool,
    pub damage_keywords: DamageKeywords,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            workbook_url: None,
            workbook_path: None,
            sources: BTreeMap::new(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            position_prefix: DEFAULT_POSITION_PREFIX.to_string(),
            count_undated_in_periods: false,
            damage_keywords: DamageKeywords::default(),
        }
    }
}

impl AppConfig {
    /// 数据源位置：单源配置优先，缺省继承工作簿级配置
    pub fn source_location(&self, kind: SourceKind) -> DocumentLocation {
        let source = self.sources.get(&kind);
        DocumentLocation {
            url: source
                .and_then(|s| s.url.clone())
                .or_else(|| self.workbook_url.clone()),
            path: source
                .and_then(|s| s.path.clone())
                .or_else(|| self.workbook_path.clone()),
        }
    }

    pub fn sheet_name(&self, kind: SourceKind) -> Option<&str> {
        self.sources.get(&kind).and_then(|s| s.sheet.as_deref())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.fetch_timeout_secs
                .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS),
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

// ==========================================
// ConfigManager - 配置加载
// ==========================================
pub struct ConfigManager;

impl ConfigManager {
    /// 从进程环境加载
    pub fn load() -> ConfigResult<AppConfig> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// 从给定的变量来源加载（测试注入用）
    ///
    /// # 参数
    /// - env: 变量名 → 值
    pub fn load_from<F>(env: F) -> ConfigResult<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(env(config_keys::CONFIG_FILE)) {
            Some(path) => Self::read_file(&path)?,
            None => AppConfig::default(),
        };
        Self::apply_env(&mut config, &env);
        config.fetch_timeout_secs = config
            .fetch_timeout_secs
            .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
        Ok(config)
    }

    fn read_file(path: &str) -> ConfigResult<AppConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn apply_env<F>(config: &mut AppConfig, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = non_empty(env(config_keys::BIND)) {
            config.bind = v;
        }
        if let Some(v) = non_empty(env(config_keys::WORKBOOK_URL)) {
            config.workbook_url = Some(v);
        }
        if let Some(v) = non_empty(env(config_keys::WORKBOOK_PATH)) {
            config.workbook_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(env(config_keys::POSITION_PREFIX)) {
            config.position_prefix = v;
        }
        if let Some(v) = non_empty(env(config_keys::COUNT_UNDATED_IN_PERIODS)) {
            config.count_undated_in_periods = is_true(&v);
        }
        if let Some(v) = non_empty(env(config_keys::FETCH_TIMEOUT_SECS)) {
            config.fetch_timeout_secs =
                parse_secs(config_keys::FETCH_TIMEOUT_SECS, &v, config.fetch_timeout_secs);
        }
        if let Some(v) = non_empty(env(config_keys::CACHE_TTL_SECS)) {
            config.cache_ttl_secs =
                parse_secs(config_keys::CACHE_TTL_SECS, &v, config.cache_ttl_secs);
        }

        for kind in SourceKind::ALL {
            let url = non_empty(env(&config_keys::source_url(kind)));
            let path = non_empty(env(&config_keys::source_path(kind)));
            let sheet = non_empty(env(&config_keys::source_sheet(kind)));
            if url.is_none() && path.is_none() && sheet.is_none() {
                continue;
            }
            let source = config.sources.entry(kind).or_default();
            if url.is_some() {
                source.url = url;
            }
            if let Some(path) = path {
                source.path = Some(PathBuf::from(path));
            }
            if sheet.is_some() {
                source.sheet = sheet;
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(key: &str, raw: &str, fallback: u64) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key = %key, value = %raw, fallback, "配置值不是有效整数，使用默认值");
            fallback
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::domain::types::SourceKind;

    // 配置文件
    pub const CONFIG_FILE: &str = "AVARIAS_CONFIG";

    // 服务
    pub const BIND: &str = "AVARIAS_BIND";

    // 数据源（工作簿级默认）
    pub const WORKBOOK_URL: &str = "AVARIAS_WORKBOOK_URL";
    pub const WORKBOOK_PATH: &str = "AVARIAS_WORKBOOK_PATH";

    // 抓取与缓存
    pub const FETCH_TIMEOUT_SECS: &str = "AVARIAS_FETCH_TIMEOUT_SECS";
    pub const CACHE_TTL_SECS: &str = "AVARIAS_CACHE_TTL_SECS";

    // 列映射
    pub const POSITION_PREFIX: &str = "AVARIAS_POSITION_PREFIX";

    // 统计口径
    pub const COUNT_UNDATED_IN_PERIODS: &str = "AVARIAS_COUNT_UNDATED_IN_PERIODS";

    // 可观测性（由 logging / perf 直接读取）
    pub const LOG_FORMAT: &str = "AVARIAS_LOG_FORMAT";
    pub const SLOW_STAGE_MS: &str = "AVARIAS_SLOW_STAGE_MS";

    /// AVARIAS_{SOURCE}_URL
    pub fn source_url(kind: SourceKind) -> String {
        format!("AVARIAS_{}_URL", kind.as_str().to_uppercase())
    }

    /// AVARIAS_{SOURCE}_PATH
    pub fn source_path(kind: SourceKind) -> String {
        format!("AVARIAS_{}_PATH", kind.as_str().to_uppercase())
    }

    /// AVARIAS_{SOURCE}_SHEET
    pub fn source_sheet(kind: SourceKind) -> String {
        format!("AVARIAS_{}_SHEET", kind.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigManager::load_from(env_of(&[])).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.position_prefix, "G300");
        assert!(!config.count_undated_in_periods);
        assert!(!config.source_location(SourceKind::Allocated).is_configured());
    }

    #[test]
    fn test_env_overrides_and_source_inheritance() {
        let config = ConfigManager::load_from(env_of(&[
            ("AVARIAS_WORKBOOK_URL", "http://sheet/export"),
            ("AVARIAS_WORKBOOK_PATH", "/data/avarias.xlsx"),
            ("AVARIAS_MOVEMENTS_URL", "http://sheet/movements"),
            ("AVARIAS_POSITIONS_SHEET", "Cadastro"),
            ("AVARIAS_FETCH_TIMEOUT_SECS", "500"),
            ("AVARIAS_CACHE_TTL_SECS", "abc"),
            ("AVARIAS_COUNT_UNDATED_IN_PERIODS", "Yes"),
        ]))
        .unwrap();

        let allocated = config.source_location(SourceKind::Allocated);
        assert_eq!(allocated.url.as_deref(), Some("http://sheet/export"));
        assert_eq!(allocated.path, Some(PathBuf::from("/data/avarias.xlsx")));

        let movements = config.source_location(SourceKind::Movements);
        assert_eq!(movements.url.as_deref(), Some("http://sheet/movements"));
        assert_eq!(movements.path, Some(PathBuf::from("/data/avarias.xlsx")));

        assert_eq!(config.sheet_name(SourceKind::Positions), Some("Cadastro"));
        assert_eq!(config.sheet_name(SourceKind::Allocated), None);
        assert_eq!(config.fetch_timeout_secs, 60);
        assert_eq!(config.cache_ttl_secs, 30);
        assert!(config.count_undated_in_periods);
    }

    #[test]
    fn test_json_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "bind": "127.0.0.1:9000",
                "position_prefix": "G400",
                "sources": {{ "unallocated": {{ "sheet": "Sem posição" }} }},
                "damage_keywords": {{ "wet": ["umid"] }}
            }}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ConfigManager::load_from(env_of(&[
            ("AVARIAS_CONFIG", path.as_str()),
            ("AVARIAS_BIND", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.position_prefix, "G400");
        assert_eq!(config.sheet_name(SourceKind::Unallocated), Some("Sem posição"));
        assert_eq!(config.damage_keywords.wet, vec!["umid".to_string()]);
        assert!(config.damage_keywords.tipped.is_empty());
        assert_eq!(config.cache_ttl_secs, 30);
    }

    #[test]
    fn test_bad_config_file() {
        let result = ConfigManager::load_from(env_of(&[("AVARIAS_CONFIG", "/nonexistent/avarias.json")]));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn test_is_true() {
        for v in ["1", "true", "YES", "y", "On"] {
            assert!(is_true(v));
        }
        assert!(!is_true("0"));
        assert!(!is_true("nao"));
    }
}
