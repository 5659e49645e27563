// ==========================================
// 仓库库存驾驶舱 - 响应 DTO
// ==========================================
// 字段名统一 snake_case（与前端约定一致）
// 星期 / 月份缩写使用葡语（前端直接展示）
// ==========================================

use crate::domain::movement::MovementRecord;
use crate::domain::types::{Period, SourceKind};
use crate::engine::{Divergence, InventoryStats, MovementTotals};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// 星期缩写
pub fn weekday_abbr(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// 月份缩写（1-12，越界返回空串）
pub fn month_abbr(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ];
    month
        .checked_sub(1)
        .and_then(|idx| MONTHS.get(idx as usize))
        .copied()
        .unwrap_or("")
}

// ==========================================
// MovementEntry - 流水展示行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementEntry {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub month: &'static str,
    pub product: String,
    pub description: String,
    pub entries: f64,
    pub exits: f64,
    pub net: f64,
    pub total: f64,
    pub origin: String,
    pub date_inferred: bool,
}

impl From<&MovementRecord> for MovementEntry {
    fn from(m: &MovementRecord) -> Self {
        Self {
            date: m.date,
            weekday: weekday_abbr(m.date.weekday()),
            month: month_abbr(m.date.month()),
            product: m.product.clone(),
            description: m.description.clone(),
            entries: m.entries,
            exits: m.exits,
            net: m.net_movement(),
            total: m.total_movement(),
            origin: m.origin.clone(),
            date_inferred: m.date_inferred,
        }
    }
}

// ==========================================
// StatsResponse - /api/stats
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub period: Period,
    pub reference_date: NaiveDate,

    // ===== 库存汇总 =====
    #[serde(flatten)]
    pub inventory: InventoryStats,

    // ===== 流水 =====
    pub period_movements: MovementTotals,
    pub cumulative_movements: MovementTotals,
    pub top_moved: Vec<MovementEntry>,
    pub latest_movements: Vec<MovementEntry>,
    pub entry_frequency: BTreeMap<String, usize>,
    pub exit_frequency: BTreeMap<String, usize>,

    // ===== 差异 =====
    pub divergences: Vec<Divergence>,

    // ===== 元信息 =====
    pub degraded_sources: Vec<SourceKind>,
}

/// 存活探针
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviations() {
        assert_eq!(weekday_abbr(Weekday::Mon), "Seg");
        assert_eq!(weekday_abbr(Weekday::Sun), "Dom");
        assert_eq!(month_abbr(1), "Jan");
        assert_eq!(month_abbr(12), "Dez");
        assert_eq!(month_abbr(0), "");
        assert_eq!(month_abbr(13), "");
    }

    #[test]
    fn test_movement_entry_from_record() {
        let record = MovementRecord {
            // 2024-02-28 是星期三
            date: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            date_inferred: false,
            product: "SKU1".to_string(),
            description: "Caixa".to_string(),
            entries: 10.0,
            exits: 4.0,
            origin: "CD".to_string(),
            wet_qty: 0.0,
            row_number: 1,
        };
        let entry = MovementEntry::from(&record);
        assert_eq!(entry.weekday, "Qua");
        assert_eq!(entry.month, "Fev");
        assert_eq!(entry.net, 6.0);
        assert_eq!(entry.total, 14.0);
    }
}
