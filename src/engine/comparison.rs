// ==========================================
// 仓库库存驾驶舱 - 数量对比 (confrontos)
// ==========================================
// 对比类型:
// - fisico_x_a501: 实物（对账后库存合计）vs A501 系统库存
// - a501_x_g501:   A501 系统库存 vs G501 系统库存
// 排序: 有差异优先 → 绝对差值降序 → 产品名升序
// ==========================================

use crate::domain::inventory::{InventoryRecord, ProductDescription};
use crate::domain::types::{ComparisonType, MISSING_TEXT, UNIDENTIFIED_PRODUCT};
use crate::engine::divergence::EPSILON;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub product: String,
    pub description: String,
    pub left_qty: f64,
    pub right_qty: f64,
    pub difference: f64, // left_qty - right_qty
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    #[serde(rename = "type")]
    pub comparison: ComparisonType,
    pub left_label: String,
    pub right_label: String,
    pub divergent_count: usize,
    pub rows: Vec<ComparisonRow>,
}

pub fn labels(comparison: ComparisonType) -> (&'static str, &'static str) {
    match comparison {
        ComparisonType::PhysicalVsA501 => ("fisico", "a501"),
        ComparisonType::A501VsG501 => ("a501", "g501"),
    }
}

/// 构造对比报表
pub fn compare(
    comparison: ComparisonType,
    records: &[InventoryRecord],
    descriptions: &[ProductDescription],
    description_index: &HashMap<&str, &str>,
) -> ComparisonReport {
    let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    match comparison {
        ComparisonType::PhysicalVsA501 => {
            for record in records {
                if record.product != UNIDENTIFIED_PRODUCT {
                    sums.entry(record.product.as_str()).or_default().0 += record.total_quantity;
                }
            }
            for item in descriptions {
                sums.entry(item.product.as_str()).or_default().1 += item.a501_quantity;
            }
        }
        ComparisonType::A501VsG501 => {
            for item in descriptions {
                let entry = sums.entry(item.product.as_str()).or_default();
                entry.0 += item.a501_quantity;
                entry.1 += item.g501_quantity;
            }
        }
    }

    let mut rows: Vec<ComparisonRow> = sums
        .into_iter()
        .map(|(product, (left, right))| ComparisonRow {
            product: product.to_string(),
            description: description_index
                .get(product)
                .map(|d| d.to_string())
                .unwrap_or_else(|| MISSING_TEXT.to_string()),
            left_qty: left,
            right_qty: right,
            difference: left - right,
        })
        .collect();

    rows.sort_by(|a, b| {
        let a_nonzero = a.difference.abs() > EPSILON;
        let b_nonzero = b.difference.abs() > EPSILON;
        b_nonzero
            .cmp(&a_nonzero)
            .then_with(|| b.difference.abs().total_cmp(&a.difference.abs()))
            .then_with(|| a.product.cmp(&b.product))
    });

    let (left_label, right_label) = labels(comparison);
    ComparisonReport {
        comparison,
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        divergent_count: rows.iter().filter(|r| r.difference.abs() > EPSILON).count(),
        rows,
    }
}
