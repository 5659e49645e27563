// ==========================================
// 仓库库存驾驶舱 - 导入层
// ==========================================
// 职责: 原始文档字节 → 工作表 → 固定字段记录
// 支持: XLSX, CSV
// ==========================================

// 模块声明
pub mod column_mapper;
pub mod damage_classifier;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod sheet_selector;
pub mod source_loader;

// 重导出核心类型
pub use column_mapper::{ColumnMapper, ColumnMapping};
pub use damage_classifier::KeywordDamageClassifier;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use sheet_selector::SheetSelector;
pub use source_loader::SourceLoader;

// 重导出 Trait 接口
pub use importer_trait::{DamageClassifier, FileParser};
