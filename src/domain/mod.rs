// ==========================================
// 仓库库存驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义记录类型、原始表格结构、枚举类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod inventory;
pub mod movement;
pub mod table;
pub mod types;

// 重导出核心类型
pub use inventory::{InventoryRecord, ProductDescription, RegisteredPosition};
pub use movement::MovementRecord;
pub use table::{CellValue, RawSheet, RawWorkbook};
pub use types::{
    CanonicalField, ComparisonType, Period, RecordSource, SourceKind, MISSING_TEXT,
    UNALLOCATED_POSITION, UNIDENTIFIED_PRODUCT,
};
