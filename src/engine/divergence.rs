// ==========================================
// 仓库库存驾驶舱 - 差异检测
// ==========================================
// 职责: 库存数量合计（按产品）vs 流水净流量合计（按产品）
// 规则: 产品键取并集；差值绝对值 > EPSILON 才输出；按绝对差值降序
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::domain::movement::MovementRecord;
use crate::domain::types::{MISSING_TEXT, UNIDENTIFIED_PRODUCT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 浮点比较容差
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub product: String,
    pub description: String,
    pub inventory_qty: f64,
    pub movement_qty: f64,
    pub difference: f64, // inventory_qty - movement_qty
}

/// 检测差异
///
/// # 参数
/// - descriptions: 产品 → 描述（展示用）
pub fn detect_divergences(
    records: &[InventoryRecord],
    movements: &[MovementRecord],
    descriptions: &HashMap<&str, &str>,
) -> Vec<Divergence> {
    // BTreeMap 保证同差值时按产品名输出
    let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for record in records {
        if record.product != UNIDENTIFIED_PRODUCT {
            sums.entry(record.product.as_str()).or_default().0 += record.total_quantity;
        }
    }
    for movement in movements {
        if movement.product != UNIDENTIFIED_PRODUCT {
            sums.entry(movement.product.as_str()).or_default().1 += movement.net_movement();
        }
    }

    let mut divergences: Vec<Divergence> = sums
        .into_iter()
        .filter(|(_, (inventory, movement))| (inventory - movement).abs() > EPSILON)
        .map(|(product, (inventory, movement))| Divergence {
            product: product.to_string(),
            description: descriptions
                .get(product)
                .map(|d| d.to_string())
                .unwrap_or_else(|| MISSING_TEXT.to_string()),
            inventory_qty: inventory,
            movement_qty: movement,
            difference: inventory - movement,
        })
        .collect();

    divergences.sort_by(|a, b| b.difference.abs().total_cmp(&a.difference.abs()));
    divergences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordSource;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn stock(product: &str, qty: f64) -> InventoryRecord {
        let mut r = InventoryRecord::empty(RecordSource::Allocated);
        r.product = product.to_string();
        r.total_quantity = qty;
        r
    }

    fn flow(product: &str, entries: f64, exits: f64) -> MovementRecord {
        MovementRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            date_inferred: false,
            product: product.to_string(),
            description: "-".to_string(),
            entries,
            exits,
            origin: "-".to_string(),
            wet_qty: 0.0,
            row_number: 1,
        }
    }

    #[test]
    fn test_divergences_union_and_order() {
        let records = vec![stock("A", 10.0), stock("A", 5.0), stock("B", 3.0), stock("C", 7.0)];
        let movements = vec![flow("A", 20.0, 5.0), flow("B", 10.0, 0.0), flow("D", 0.0, 2.0)];
        let mut descriptions = HashMap::new();
        descriptions.insert("B", "Produto B");

        let result = detect_divergences(&records, &movements, &descriptions);
        let products: Vec<&str> = result.iter().map(|d| d.product.as_str()).collect();

        // A: 15 vs 15 → 不输出
        assert_eq!(products, vec!["B", "C", "D"]);
        assert_eq!(result[0].difference, -7.0);
        assert_eq!(result[0].description, "Produto B");
        assert_eq!(result[2].movement_qty, -2.0);
        assert_eq!(result[2].description, "-");
    }

    #[test]
    fn test_each_product_once_and_sentinel_excluded() {
        let records = vec![stock("A", 1.0), stock("A", 1.0), stock(UNIDENTIFIED_PRODUCT, 9.0)];
        let movements = vec![flow("A", 0.0, 0.0), flow("A", 1.0, 0.0), flow(UNIDENTIFIED_PRODUCT, 4.0, 0.0)];
        let result = detect_divergences(&records, &movements, &HashMap::new());

        let unique: HashSet<&str> = result.iter().map(|d| d.product.as_str()).collect();
        assert_eq!(unique.len(), result.len());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].difference, 1.0);
    }
}
