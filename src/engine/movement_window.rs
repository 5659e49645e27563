// ==========================================
// 仓库库存驾驶舱 - 流水时间窗口
// ==========================================
// 职责: 按统计周期筛选流水、排序、汇总
// 周期: today = 当天；week = 含当天的近 7 天；month = 含当天的近 30 天；
//       recent = 不筛选
// 排序: 日期降序；同日期按源表顺序倒序（后录入的在前）
// ==========================================

use crate::domain::movement::MovementRecord;
use crate::domain::types::Period;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 流水合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementTotals {
    pub entries: f64,
    pub exits: f64,
    pub net: f64,
}

impl MovementTotals {
    pub fn of<'a>(movements: impl IntoIterator<Item = &'a MovementRecord>) -> Self {
        let mut totals = Self::default();
        for m in movements {
            totals.entries += m.entries;
            totals.exits += m.exits;
        }
        totals.net = totals.entries - totals.exits;
        totals
    }
}

/// 最近优先
pub fn most_recent_first(a: &MovementRecord, b: &MovementRecord) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.row_number.cmp(&a.row_number))
}

#[derive(Debug, Clone, Copy)]
pub struct MovementWindow {
    today: NaiveDate,
    count_undated: bool,
}

impl MovementWindow {
    /// # 参数
    /// - today: 窗口的参照日
    /// - count_undated: 日期回退为当天的行是否计入 today/week/month
    pub fn new(today: NaiveDate, count_undated: bool) -> Self {
        Self {
            today,
            count_undated,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn contains(&self, period: Period, movement: &MovementRecord) -> bool {
        let Some(lookback) = period.lookback_days() else {
            return true;
        };
        if movement.date_inferred && !self.count_undated {
            return false;
        }
        let start = self.today - Duration::days(lookback.saturating_sub(1).max(0));
        movement.date >= start && movement.date <= self.today
    }

    /// 窗口内流水，已按最近优先排序
    pub fn select<'a>(&self, period: Period, movements: &'a [MovementRecord]) -> Vec<&'a MovementRecord> {
        let mut selected: Vec<&MovementRecord> = movements
            .iter()
            .filter(|m| self.contains(period, m))
            .collect();
        selected.sort_by(|a, b| most_recent_first(a, b));
        selected
    }
}

/// 最近 N 条（不受周期影响）
pub fn latest(movements: &[MovementRecord], limit: usize) -> Vec<&MovementRecord> {
    let mut all: Vec<&MovementRecord> = movements.iter().collect();
    all.sort_by(|a, b| most_recent_first(a, b));
    all.truncate(limit);
    all
}

/// 每个产品的入库 / 出库次数
///
/// # 返回
/// (入库频次, 出库频次)，仅统计对应数量 > 0 的行
pub fn frequency_maps<'a>(
    movements: impl IntoIterator<Item = &'a MovementRecord>,
) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut entries: BTreeMap<String, usize> = BTreeMap::new();
    let mut exits: BTreeMap<String, usize> = BTreeMap::new();
    for m in movements {
        if m.entries > 0.0 {
            *entries.entry(m.product.clone()).or_insert(0) += 1;
        }
        if m.exits > 0.0 {
            *exits.entry(m.product.clone()).or_insert(0) += 1;
        }
    }
    (entries, exits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(date: NaiveDate, product: &str, entries: f64, exits: f64, row: usize) -> MovementRecord {
        MovementRecord {
            date,
            date_inferred: false,
            product: product.to_string(),
            description: "-".to_string(),
            entries,
            exits,
            origin: "-".to_string(),
            wet_qty: 0.0,
            row_number: row,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_week_window_is_seven_days_inclusive() {
        let today = day(15);
        let movements = vec![
            mv(day(8), "OLD", 1.0, 0.0, 1),
            mv(day(9), "EDGE", 1.0, 0.0, 2),
            mv(day(15), "TODAY", 1.0, 0.0, 3),
            mv(day(16), "FUTURE", 1.0, 0.0, 4),
            mv(day(12), "MID", 1.0, 0.0, 5),
        ];
        let window = MovementWindow::new(today, false);
        let products: Vec<&str> = window
            .select(Period::Week, &movements)
            .iter()
            .map(|m| m.product.as_str())
            .collect();
        assert_eq!(products, vec!["TODAY", "MID", "EDGE"]);
    }

    #[test]
    fn test_today_and_month() {
        let today = day(30);
        let movements = vec![mv(day(30), "A", 1.0, 0.0, 1), mv(day(1), "B", 1.0, 0.0, 2)];
        let window = MovementWindow::new(today, false);
        assert_eq!(window.select(Period::Today, &movements).len(), 1);
        assert_eq!(window.select(Period::Month, &movements).len(), 2);

        let window = MovementWindow::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), false);
        assert_eq!(window.select(Period::Month, &movements).len(), 1);
    }

    #[test]
    fn test_recent_ties_prefer_later_rows() {
        let movements = vec![
            mv(day(10), "first", 1.0, 0.0, 1),
            mv(day(12), "newest", 1.0, 0.0, 2),
            mv(day(10), "second", 1.0, 0.0, 3),
        ];
        let window = MovementWindow::new(day(15), false);
        let products: Vec<&str> = window
            .select(Period::Recent, &movements)
            .iter()
            .map(|m| m.product.as_str())
            .collect();
        assert_eq!(products, vec!["newest", "second", "first"]);
    }

    #[test]
    fn test_inferred_dates_excluded_from_periods_by_default() {
        let today = day(15);
        let mut undated = mv(today, "X", 1.0, 0.0, 1);
        undated.date_inferred = true;
        let movements = vec![undated];

        let strict = MovementWindow::new(today, false);
        assert!(strict.select(Period::Today, &movements).is_empty());
        assert_eq!(strict.select(Period::Recent, &movements).len(), 1);

        let lenient = MovementWindow::new(today, true);
        assert_eq!(lenient.select(Period::Today, &movements).len(), 1);
    }

    #[test]
    fn test_totals_latest_and_frequency() {
        let movements = vec![
            mv(day(1), "A", 10.0, 0.0, 1),
            mv(day(2), "A", 0.0, 4.0, 2),
            mv(day(3), "B", 5.0, 5.0, 3),
        ];
        let totals = MovementTotals::of(&movements);
        assert_eq!(totals, MovementTotals { entries: 15.0, exits: 9.0, net: 6.0 });

        let latest: Vec<usize> = latest(&movements, 2).iter().map(|m| m.row_number).collect();
        assert_eq!(latest, vec![3, 2]);

        let (entries, exits) = frequency_maps(&movements);
        assert_eq!(entries.get("A"), Some(&1));
        assert_eq!(entries.get("B"), Some(&1));
        assert_eq!(exits.get("A"), Some(&1));
        assert_eq!(exits.get("B"), Some(&1));
    }
}
