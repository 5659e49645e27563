// ==========================================
// 仓库库存驾驶舱 - 库存领域模型
// ==========================================
// 用途: 对账管道的输出（加载 → 对账 → 平衡 → 指标）
// 红线: 每次请求重新生成，不跨请求共享/修改
// ==========================================

use crate::domain::types::{RecordSource, MISSING_TEXT, UNALLOCATED_POSITION, UNIDENTIFIED_PRODUCT};
use serde::{Deserialize, Serialize};

// ==========================================
// InventoryRecord - 对账后的库存行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    // ===== 标识 =====
    pub position: String,    // 库位（未分配 → "unallocated"）
    pub product: String,     // 产品编码（缺失 → "unidentified"）
    pub description: String, // 产品描述（缺失 → "-"）

    // ===== 数量 =====
    pub total_quantity: f64,
    pub pallet_count: f64, // 经共享托盘平衡后的托盘数
    pub capacity: f64,     // 库位容量（取自库位主数据）
    pub quantity_per_pallet: f64,

    // ===== 库位展示字段 =====
    pub level: String,
    pub depth: String,

    // ===== 共享托盘 =====
    pub shared_pallet_id: String, // 空串 = 非共享

    // ===== 损坏 =====
    pub wet_damage_qty: f64,
    pub tipped_damage_qty: f64,
    pub is_wet_flag: bool,
    pub is_tipped_flag: bool,
    pub observation: String,

    // ===== 派生标志 =====
    pub is_unregistered_error: bool,
    pub is_mixed: bool,
    pub occupancy_pct: f64,

    // ===== 元信息 =====
    pub source: RecordSource,
}

impl InventoryRecord {
    /// 以类型默认值填充的空记录
    pub fn empty(source: RecordSource) -> Self {
        let position = match source {
            RecordSource::Unallocated => UNALLOCATED_POSITION,
            _ => MISSING_TEXT,
        };
        Self {
            position: position.to_string(),
            product: UNIDENTIFIED_PRODUCT.to_string(),
            description: MISSING_TEXT.to_string(),
            total_quantity: 0.0,
            pallet_count: 0.0,
            capacity: 0.0,
            quantity_per_pallet: 0.0,
            level: MISSING_TEXT.to_string(),
            depth: MISSING_TEXT.to_string(),
            shared_pallet_id: String::new(),
            wet_damage_qty: 0.0,
            tipped_damage_qty: 0.0,
            is_wet_flag: false,
            is_tipped_flag: false,
            observation: String::new(),
            is_unregistered_error: false,
            is_mixed: false,
            occupancy_pct: 0.0,
            source,
        }
    }

    pub fn is_unallocated(&self) -> bool {
        self.source == RecordSource::Unallocated || self.position == UNALLOCATED_POSITION
    }

    pub fn has_identified_product(&self) -> bool {
        self.product != UNIDENTIFIED_PRODUCT
    }
}

// ==========================================
// RegisteredPosition - 库位主数据
// ==========================================
// 用途: 权威库位清单（容量来源）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredPosition {
    pub position: String,
    pub capacity: f64,
    pub level: String,
    pub depth: String,
}

// ==========================================
// ProductDescription - 产品描述
// ==========================================
// 附带系统库存（A501 / G501），供对比接口使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescription {
    pub product: String,
    pub description: String,
    pub a501_quantity: f64,
    pub g501_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_unallocated_record_uses_sentinels() {
        let record = InventoryRecord::empty(RecordSource::Unallocated);
        assert_eq!(record.position, UNALLOCATED_POSITION);
        assert_eq!(record.product, UNIDENTIFIED_PRODUCT);
        assert_eq!(record.description, "-");
        assert!(record.is_unallocated());
        assert!(!record.has_identified_product());
    }

    #[test]
    fn test_record_serializes_with_snake_case_fields() {
        let record = InventoryRecord::empty(RecordSource::Allocated);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("occupancy_pct").is_some());
        assert!(json.get("is_unregistered_error").is_some());
        assert_eq!(json["source"], "allocated");
    }
}
