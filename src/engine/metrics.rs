// ==========================================
// 仓库库存驾驶舱 - 库存指标
// ==========================================
// 职责: 占用率计算 + 库存汇总统计
// 口径: 占用率不封顶；非有限值记为 0
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::domain::types::{MISSING_TEXT, UNALLOCATED_POSITION};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 占用率（%）
///
/// # 规则
/// - capacity > 0 且非未分配 → pallet_count / capacity * 100
/// - 其他 → 0
pub fn occupancy_pct(pallet_count: f64, capacity: f64, unallocated: bool) -> f64 {
    if unallocated || !(capacity > 0.0) {
        return 0.0;
    }
    let pct = pallet_count / capacity * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// 两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 库存汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_pallets: f64,
    pub total_quantity: f64,
    pub total_positions: usize,
    pub total_skus: usize,
    pub avg_occupancy: f64,
    pub wet_damage_qty: f64,
    pub tipped_damage_qty: f64,
    pub wet_count: usize,
    pub tipped_count: usize,
    pub unregistered_count: usize,
    pub mixed_positions: usize,
    pub unallocated_count: usize,
}

pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 回写每行占用率（须在托盘平衡之后）
    pub fn apply_occupancy(&self, records: &mut [InventoryRecord]) {
        for record in records.iter_mut() {
            if record.is_unallocated() {
                record.capacity = 0.0;
            }
            record.occupancy_pct =
                occupancy_pct(record.pallet_count, record.capacity, record.is_unallocated());
        }
    }

    pub fn inventory_stats(&self, records: &[InventoryRecord]) -> InventoryStats {
        let mut stats = InventoryStats::default();
        let mut positions: HashSet<&str> = HashSet::new();
        let mut products: HashSet<&str> = HashSet::new();
        let mut mixed: HashSet<&str> = HashSet::new();
        let mut occupancy_sum = 0.0;
        let mut occupancy_rows = 0usize;

        for record in records {
            stats.total_pallets += record.pallet_count;
            stats.total_quantity += record.total_quantity;
            stats.wet_damage_qty += record.wet_damage_qty;
            stats.tipped_damage_qty += record.tipped_damage_qty;

            if record.is_wet_flag {
                stats.wet_count += 1;
            }
            if record.is_tipped_flag {
                stats.tipped_count += 1;
            }
            if record.is_unregistered_error {
                stats.unregistered_count += 1;
            }
            if record.is_unallocated() {
                stats.unallocated_count += 1;
            }

            if record.position != UNALLOCATED_POSITION && record.position != MISSING_TEXT {
                positions.insert(record.position.as_str());
                if record.is_mixed {
                    mixed.insert(record.position.as_str());
                }
            }
            if record.has_identified_product() {
                products.insert(record.product.as_str());
            }
            if record.capacity > 0.0 {
                occupancy_sum += record.occupancy_pct;
                occupancy_rows += 1;
            }
        }

        stats.total_positions = positions.len();
        stats.total_skus = products.len();
        stats.mixed_positions = mixed.len();
        stats.avg_occupancy = if occupancy_rows > 0 {
            round2(occupancy_sum / occupancy_rows as f64)
        } else {
            0.0
        };
        stats
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordSource;

    fn row(position: &str, product: &str, pallets: f64, capacity: f64) -> InventoryRecord {
        let mut r = InventoryRecord::empty(RecordSource::Allocated);
        r.position = position.to_string();
        r.product = product.to_string();
        r.pallet_count = pallets;
        r.capacity = capacity;
        r
    }

    #[test]
    fn test_occupancy_rules() {
        assert_eq!(occupancy_pct(4.0, 4.0, false), 100.0);
        assert_eq!(occupancy_pct(12.0, 4.0, false), 300.0);
        assert_eq!(occupancy_pct(4.0, 0.0, false), 0.0);
        assert_eq!(occupancy_pct(4.0, 4.0, true), 0.0);
        assert_eq!(occupancy_pct(f64::INFINITY, 4.0, false), 0.0);
    }

    #[test]
    fn test_apply_occupancy_forces_unallocated_to_zero() {
        let mut item = InventoryRecord::empty(RecordSource::Unallocated);
        item.pallet_count = 2.0;
        item.capacity = 5.0;
        let mut records = vec![row("A01", "SKU1", 4.0, 4.0), item];

        MetricsEngine::new().apply_occupancy(&mut records);
        assert_eq!(records[0].occupancy_pct, 100.0);
        assert_eq!(records[1].capacity, 0.0);
        assert_eq!(records[1].occupancy_pct, 0.0);
    }

    #[test]
    fn test_inventory_stats() {
        let mut wet = row("A02", "SKU2", 1.0, 4.0);
        wet.is_wet_flag = true;
        wet.wet_damage_qty = 3.0;
        wet.total_quantity = 10.0;

        let mut loose = InventoryRecord::empty(RecordSource::Unallocated);
        loose.product = "SKU1".to_string();
        loose.total_quantity = 5.0;
        loose.pallet_count = 1.0;

        let mut records = vec![row("A01", "SKU1", 4.0, 4.0), wet, loose, row("C03", "unidentified", 0.0, 2.0)];
        let engine = MetricsEngine::new();
        engine.apply_occupancy(&mut records);
        let stats = engine.inventory_stats(&records);

        assert_eq!(stats.total_pallets, 6.0);
        assert_eq!(stats.total_quantity, 15.0);
        assert_eq!(stats.total_positions, 3);
        assert_eq!(stats.total_skus, 2);
        // (100 + 25 + 0) / 3
        assert_eq!(stats.avg_occupancy, 41.67);
        assert_eq!(stats.wet_count, 1);
        assert_eq!(stats.wet_damage_qty, 3.0);
        assert_eq!(stats.unallocated_count, 1);
    }
}
