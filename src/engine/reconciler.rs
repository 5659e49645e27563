// ==========================================
// 仓库库存驾驶舱 - 对账引擎
// ==========================================
// 职责: 已分配库存 ⟗ 库位主数据（全外连接）+ 未分配物品 + 产品描述
// 红线: 容量只取主数据侧；主数据缺失时降级为简单并集
// ==========================================
// 输出顺序: 已分配行（源顺序）→ 空库位（主数据顺序）→ 未分配行
// ==========================================

use crate::domain::inventory::{InventoryRecord, ProductDescription, RegisteredPosition};
use crate::domain::types::{RecordSource, MISSING_TEXT};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

// ==========================================
// Reconciler - 对账引擎
// ==========================================
pub struct Reconciler {}

impl Reconciler {
    pub fn new() -> Self {
        Self {}
    }

    /// 合并各数据源
    ///
    /// # 参数
    /// - allocated: 已分配库位表记录
    /// - positions: 库位主数据（为空 → 降级模式）
    /// - unallocated: 未分配物品记录（原样追加）
    /// - descriptions: 产品描述（同一产品取首条）
    ///
    /// # 规则
    /// 1. 命中主数据: capacity 取主数据；层级/深度缺失时用主数据补齐
    /// 2. 未命中主数据: capacity = 0，标记 is_unregistered_error（缺失库位 "-" 不算未登记）
    /// 3. 主数据中无库存的库位: 生成 RegisteredOnly 空库位行
    /// 4. 降级模式: 保留已分配行自带容量，不做未登记检测
    #[instrument(skip_all, fields(
        allocated = allocated.len(),
        positions = positions.len(),
        unallocated = unallocated.len()
    ))]
    pub fn reconcile(
        &self,
        allocated: Vec<InventoryRecord>,
        positions: &[RegisteredPosition],
        unallocated: Vec<InventoryRecord>,
        descriptions: &[ProductDescription],
    ) -> Vec<InventoryRecord> {
        let mut records = if positions.is_empty() {
            warn!("库位主数据为空，降级为已分配 + 未分配并集");
            allocated
        } else {
            self.join_master(allocated, positions)
        };

        records.extend(unallocated.into_iter().map(|mut record| {
            record.capacity = 0.0;
            record.is_unregistered_error = false;
            record
        }));

        self.apply_descriptions(&mut records, descriptions);
        records
    }

    fn join_master(
        &self,
        allocated: Vec<InventoryRecord>,
        positions: &[RegisteredPosition],
    ) -> Vec<InventoryRecord> {
        // 主数据重复库位取首条
        let mut master: HashMap<&str, &RegisteredPosition> = HashMap::with_capacity(positions.len());
        for registered in positions {
            master.entry(registered.position.as_str()).or_insert(registered);
        }

        let mut matched: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(allocated.len() + master.len());
        let mut unregistered = 0usize;

        for mut record in allocated {
            match master.get(record.position.as_str()) {
                Some(registered) => {
                    record.capacity = registered.capacity;
                    if record.level == MISSING_TEXT {
                        record.level = registered.level.clone();
                    }
                    if record.depth == MISSING_TEXT {
                        record.depth = registered.depth.clone();
                    }
                    record.is_unregistered_error = false;
                    matched.insert(record.position.clone());
                }
                None => {
                    record.capacity = 0.0;
                    record.is_unregistered_error =
                        !record.is_unallocated() && record.position != MISSING_TEXT;
                    if record.is_unregistered_error {
                        unregistered += 1;
                    }
                }
            }
            records.push(record);
        }

        let mut emitted: HashSet<&str> = HashSet::new();
        for registered in positions {
            let position = registered.position.as_str();
            if matched.contains(position) || !emitted.insert(position) {
                continue;
            }
            let mut record = InventoryRecord::empty(RecordSource::RegisteredOnly);
            record.position = registered.position.clone();
            record.capacity = registered.capacity;
            record.level = registered.level.clone();
            record.depth = registered.depth.clone();
            records.push(record);
        }

        debug!(
            matched = matched.len(),
            empty_positions = emitted.len(),
            unregistered,
            "主数据连接完成"
        );
        records
    }

    fn apply_descriptions(&self, records: &mut [InventoryRecord], descriptions: &[ProductDescription]) {
        let index = description_index(descriptions);
        for record in records.iter_mut() {
            if let Some(description) = index.get(record.product.as_str()) {
                record.description = description.to_string();
            } else if record.description.trim().is_empty() {
                record.description = MISSING_TEXT.to_string();
            }
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// 产品 → 描述（首条有效描述生效）
pub fn description_index(descriptions: &[ProductDescription]) -> HashMap<&str, &str> {
    let mut index: HashMap<&str, &str> = HashMap::with_capacity(descriptions.len());
    for item in descriptions {
        if item.description == MISSING_TEXT {
            continue;
        }
        index
            .entry(item.product.as_str())
            .or_insert(item.description.as_str());
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UNALLOCATED_POSITION;

    fn allocated(position: &str, product: &str, capacity: f64) -> InventoryRecord {
        let mut r = InventoryRecord::empty(RecordSource::Allocated);
        r.position = position.to_string();
        r.product = product.to_string();
        r.capacity = capacity;
        r
    }

    fn unallocated(product: &str) -> InventoryRecord {
        let mut r = InventoryRecord::empty(RecordSource::Unallocated);
        r.product = product.to_string();
        r
    }

    fn registered(position: &str, capacity: f64) -> RegisteredPosition {
        RegisteredPosition {
            position: position.to_string(),
            capacity,
            level: "1".to_string(),
            depth: "2".to_string(),
        }
    }

    fn description(product: &str, text: &str) -> ProductDescription {
        ProductDescription {
            product: product.to_string(),
            description: text.to_string(),
            a501_quantity: 0.0,
            g501_quantity: 0.0,
        }
    }

    #[test]
    fn test_full_outer_join_with_master() {
        let records = Reconciler::new().reconcile(
            vec![allocated("A01", "SKU1", 99.0), allocated("B12", "SKU2", 7.0)],
            &[registered("A01", 4.0), registered("C03", 2.0)],
            vec![],
            &[],
        );

        assert_eq!(records.len(), 3);

        let a01 = &records[0];
        assert_eq!(a01.capacity, 4.0);
        assert_eq!(a01.level, "1");
        assert!(!a01.is_unregistered_error);

        let b12 = &records[1];
        assert_eq!(b12.capacity, 0.0);
        assert!(b12.is_unregistered_error);

        let c03 = &records[2];
        assert_eq!(c03.position, "C03");
        assert_eq!(c03.source, RecordSource::RegisteredOnly);
        assert_eq!(c03.capacity, 2.0);
        assert!(!c03.is_unregistered_error);
    }

    #[test]
    fn test_blank_position_is_not_unregistered() {
        let records = Reconciler::new().reconcile(
            vec![allocated(MISSING_TEXT, "SKU1", 0.0), allocated("B12", "SKU2", 0.0)],
            &[registered("A01", 4.0)],
            vec![],
            &[],
        );

        let blank = records.iter().find(|r| r.product == "SKU1").unwrap();
        assert_eq!(blank.capacity, 0.0);
        assert!(!blank.is_unregistered_error);
        assert!(records.iter().find(|r| r.product == "SKU2").unwrap().is_unregistered_error);
    }

    #[test]
    fn test_missing_master_degrades_to_union() {
        let records = Reconciler::new().reconcile(
            vec![allocated("B12", "SKU2", 7.0)],
            &[],
            vec![unallocated("SKU3")],
            &[],
        );

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_unregistered_error));
        assert_eq!(records[0].capacity, 7.0);
        assert_eq!(records[1].position, UNALLOCATED_POSITION);
    }

    #[test]
    fn test_unallocated_rows_never_unregistered_and_zero_capacity() {
        let mut item = unallocated("SKU3");
        item.capacity = 12.0;
        let records = Reconciler::new().reconcile(vec![], &[registered("A01", 4.0)], vec![item], &[]);

        let item = records.iter().find(|r| r.source == RecordSource::Unallocated).unwrap();
        assert_eq!(item.capacity, 0.0);
        assert!(!item.is_unregistered_error);
    }

    #[test]
    fn test_duplicate_master_positions_use_first() {
        let records = Reconciler::new().reconcile(
            vec![allocated("A01", "SKU1", 0.0)],
            &[registered("A01", 4.0), registered("A01", 8.0), registered("D04", 1.0), registered("D04", 3.0)],
            vec![],
            &[],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].capacity, 4.0);
        assert_eq!(records[1].capacity, 1.0);
    }

    #[test]
    fn test_first_description_wins() {
        let mut own = allocated("A01", "SKU9", 0.0);
        own.description = "texto da planilha".to_string();

        let records = Reconciler::new().reconcile(
            vec![allocated("A01", "SKU1", 0.0), own],
            &[registered("A01", 4.0)],
            vec![],
            &[description("SKU1", "Primeira"), description("SKU1", "Segunda")],
        );
        assert_eq!(records[0].description, "Primeira");
        assert_eq!(records[1].description, "texto da planilha");
    }
}
