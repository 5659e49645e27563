// ==========================================
// 仓库库存驾驶舱 - 托盘平衡引擎
// ==========================================
// 职责: 共享托盘按出现次数均分托盘数；标记混放库位
// 红线: 同一共享 ID 的所有行托盘数之和 = 1
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::domain::types::{RecordSource, MISSING_TEXT, UNALLOCATED_POSITION};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// 共享托盘 ID 是否有效（空 / "0" / "none" / "nan" 视为非共享）
pub fn is_shared_pallet_id(id: &str) -> bool {
    let id = id.trim();
    !id.is_empty() && id != "0" && !id.eq_ignore_ascii_case("none") && !id.eq_ignore_ascii_case("nan")
}

pub struct PalletBalancer {}

impl PalletBalancer {
    pub fn new() -> Self {
        Self {}
    }

    /// 平衡 + 混放标记
    pub fn apply(&self, records: &mut [InventoryRecord]) {
        self.balance_shared_pallets(records);
        self.flag_mixed_positions(records);
    }

    /// 共享托盘均分
    ///
    /// # 规则
    /// - 有效共享 ID 出现 N 次 → 每行 pallet_count = 1 / N
    /// - 无共享 ID 的行保持原值
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn balance_shared_pallets(&self, records: &mut [InventoryRecord]) {
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for record in records.iter() {
            if is_shared_pallet_id(&record.shared_pallet_id) {
                *occurrences.entry(record.shared_pallet_id.trim().to_string()).or_insert(0) += 1;
            }
        }
        if occurrences.is_empty() {
            return;
        }

        for record in records.iter_mut() {
            if let Some(count) = occurrences.get(record.shared_pallet_id.trim()) {
                record.pallet_count = 1.0 / *count as f64;
            }
        }
        debug!(shared_pallets = occurrences.len(), "共享托盘均分完成");
    }

    /// 混放库位标记
    ///
    /// # 规则
    /// - 仅统计已分配行；排除未分配哨兵与缺失库位
    /// - 同一库位上有效产品（非 "unidentified"）种类 > 1 → 该库位所有已分配行 is_mixed
    pub fn flag_mixed_positions(&self, records: &mut [InventoryRecord]) {
        let mut products_by_position: HashMap<&str, HashSet<&str>> = HashMap::new();
        for record in records.iter() {
            if !Self::counts_for_mix(record) {
                continue;
            }
            products_by_position
                .entry(record.position.as_str())
                .or_default()
                .insert(record.product.as_str());
        }

        let mixed: HashSet<String> = products_by_position
            .into_iter()
            .filter(|(_, products)| products.len() > 1)
            .map(|(position, _)| position.to_string())
            .collect();

        for record in records.iter_mut() {
            record.is_mixed = record.source == RecordSource::Allocated && mixed.contains(&record.position);
        }
    }

    fn counts_for_mix(record: &InventoryRecord) -> bool {
        record.source == RecordSource::Allocated
            && record.position != UNALLOCATED_POSITION
            && record.position != MISSING_TEXT
            && record.has_identified_product()
    }
}

impl Default for PalletBalancer {
    fn default() -> Self {
        Self::new()
    }
}
