// ==========================================
// 仓库库存驾驶舱 - 导入层 Trait
// ==========================================
// 职责: 定义导入管道各阶段的可替换接口（不包含实现）
// ==========================================

use crate::domain::table::RawWorkbook;
use crate::importer::error::ImportResult;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 原始字节 → RawWorkbook
// 实现者: ExcelParser / CsvParser / UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文档
    ///
    /// # 参数
    /// - document_name: 文档名称（CSV 时作为工作表名）
    /// - bytes: 文档原始字节
    fn parse_document(&self, document_name: &str, bytes: &[u8]) -> ImportResult<RawWorkbook>;
}

// ==========================================
// DamageClassifier Trait
// ==========================================
// 用途: 从自由文本（产品 + 备注）判断损坏类型
// 实现者: KeywordDamageClassifier
// 说明: 关键词匹配较脆弱，可整体替换而不影响管道
pub trait DamageClassifier: Send + Sync {
    /// 文本是否表示受潮
    fn is_wet(&self, text: &str) -> bool;

    /// 文本是否表示倾倒
    fn is_tipped(&self, text: &str) -> bool;
}
