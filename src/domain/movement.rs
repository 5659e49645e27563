// ==========================================
// 仓库库存驾驶舱 - 出入库流水模型
// ==========================================
// 生命周期: 每次请求从源文档重新计算，不持久化
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MovementRecord - 流水行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    pub date_inferred: bool, // 日期无法解析时回退为当天
    pub product: String,
    pub description: String,
    pub entries: f64,
    pub exits: f64,
    pub origin: String,
    pub wet_qty: f64,
    pub row_number: usize, // 源表中的顺序（稳定排序用）
}

impl MovementRecord {
    /// 净流量 = 入库 - 出库
    pub fn net_movement(&self) -> f64 {
        self.entries - self.exits
    }

    /// 总流量 = 入库 + 出库
    pub fn total_movement(&self) -> f64 {
        self.entries + self.exits
    }
}
