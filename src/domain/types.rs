// ==========================================
// 仓库库存驾驶舱 - 领域类型定义
// ==========================================
// 职责: 记录来源 / 统计周期 / 对比类型 / 标准字段名 / 哨兵值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 哨兵值
// ==========================================

/// 未分配库位的记录统一使用的库位标识
pub const UNALLOCATED_POSITION: &str = "unallocated";

/// 缺失产品编码时的占位值
pub const UNIDENTIFIED_PRODUCT: &str = "unidentified";

/// 缺失展示字段（描述/层级/深度）时的占位值
pub const MISSING_TEXT: &str = "-";

// ==========================================
// 记录来源 (Record Source)
// ==========================================
// 序列化格式: snake_case (与前端一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Allocated,      // 已分配库位表
    Unallocated,    // 未分配物品表
    RegisteredOnly, // 仅存在于库位主数据（空库位）
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Allocated => write!(f, "allocated"),
            RecordSource::Unallocated => write!(f, "unallocated"),
            RecordSource::RegisteredOnly => write!(f, "registered_only"),
        }
    }
}

// ==========================================
// 逻辑数据源 (Source Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Allocated,
    Unallocated,
    Positions,
    Descriptions,
    Movements,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Allocated,
        SourceKind::Unallocated,
        SourceKind::Positions,
        SourceKind::Descriptions,
        SourceKind::Movements,
    ];

    /// 环境变量 / 配置文件中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Allocated => "allocated",
            SourceKind::Unallocated => "unallocated",
            SourceKind::Positions => "positions",
            SourceKind::Descriptions => "descriptions",
            SourceKind::Movements => "movements",
        }
    }

    /// 工作表名称提示（已做小写 + 去重音）
    pub fn sheet_hints(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Allocated => &["alocad", "allocated", "estoque", "inventory"],
            SourceKind::Unallocated => &["nao aloc", "sem posi", "unalloc"],
            SourceKind::Positions => &["cadastr", "posicoes", "positions", "enderec"],
            SourceKind::Descriptions => &["descri", "produtos", "products"],
            SourceKind::Movements => &["registro", "register", "moviment", "movement"],
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 统计周期 (Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,  // 当天
    Week,   // 最近 7 天（含当天）
    Month,  // 最近 30 天（含当天）
    Recent, // 不过滤
}

impl Period {
    /// 回溯天数（Recent 不限）
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Period::Today => Some(0),
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Recent => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Recent => write!(f, "recent"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "hoje" => Ok(Period::Today),
            "week" | "semana" | "semanal" => Ok(Period::Week),
            "month" | "mes" | "mensal" => Ok(Period::Month),
            "recent" | "recentes" | "" => Ok(Period::Recent),
            other => Err(format!("未知统计周期: {}", other)),
        }
    }
}

// ==========================================
// 对比类型 (Comparison Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonType {
    /// 实物库存 vs A501 系统库存
    #[serde(rename = "fisico_x_a501")]
    PhysicalVsA501,
    /// A501 vs G501
    #[serde(rename = "a501_x_g501")]
    A501VsG501,
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonType::PhysicalVsA501 => write!(f, "fisico_x_a501"),
            ComparisonType::A501VsG501 => write!(f, "a501_x_g501"),
        }
    }
}

impl FromStr for ComparisonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fisico_x_a501" | "" => Ok(ComparisonType::PhysicalVsA501),
            "a501_x_g501" => Ok(ComparisonType::A501VsG501),
            other => Err(format!("未知对比类型: {}", other)),
        }
    }
}

// ==========================================
// 标准字段名 (Canonical Field)
// ==========================================
// 红线: 每个语义概念只有一个标准字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Position,
    Product,
    Description,
    Capacity,
    TotalQuantity,
    PalletCount,
    Level,
    Depth,
    QuantityPerPallet,
    SharedPalletId,
    TippedDamageQty,
    WetDamageQty,
    Observation,
    A501Quantity,
    G501Quantity,
    Date,
    Entries,
    Exits,
    Origin,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Position => "position",
            CanonicalField::Product => "product",
            CanonicalField::Description => "description",
            CanonicalField::Capacity => "capacity",
            CanonicalField::TotalQuantity => "total_quantity",
            CanonicalField::PalletCount => "pallet_count",
            CanonicalField::Level => "level",
            CanonicalField::Depth => "depth",
            CanonicalField::QuantityPerPallet => "quantity_per_pallet",
            CanonicalField::SharedPalletId => "shared_pallet_id",
            CanonicalField::TippedDamageQty => "tipped_damage_qty",
            CanonicalField::WetDamageQty => "wet_damage_qty",
            CanonicalField::Observation => "observation",
            CanonicalField::A501Quantity => "a501_quantity",
            CanonicalField::G501Quantity => "g501_quantity",
            CanonicalField::Date => "date",
            CanonicalField::Entries => "entries",
            CanonicalField::Exits => "exits",
            CanonicalField::Origin => "origin",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse_with_aliases() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("Semana".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("hoje".parse::<Period>().unwrap(), Period::Today);
        assert_eq!("mensal".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("".parse::<Period>().unwrap(), Period::Recent);
        assert!("yearly".parse::<Period>().is_err());
    }

    #[test]
    fn test_comparison_type_roundtrip_names() {
        let t: ComparisonType = "a501_x_g501".parse().unwrap();
        assert_eq!(t, ComparisonType::A501VsG501);
        assert_eq!(t.to_string(), "a501_x_g501");
        assert_eq!(
            serde_json::to_string(&ComparisonType::PhysicalVsA501).unwrap(),
            "\"fisico_x_a501\""
        );
    }

    #[test]
    fn test_record_source_serialization() {
        assert_eq!(
            serde_json::to_string(&RecordSource::RegisteredOnly).unwrap(),
            "\"registered_only\""
        );
    }
}
