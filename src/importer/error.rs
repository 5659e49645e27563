// ==========================================
// 仓库库存驾驶舱 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单元格级别的类型转换失败在 data_cleaner 内部吸收，不进入此枚举
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文档相关错误 =====
    #[error("文档为空: {0}")]
    EmptyDocument(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 选表错误 =====
    #[error("工作表不存在: {0}")]
    SheetNotFound(String),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
