// ==========================================
// 仓库库存驾驶舱 - 文档仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 网络 / 文件失败在 DocumentRepository 内部逐级回退，
//       只有整条回退链都失败才以 SourceUnavailable 向上传播
// ==========================================

use thiserror::Error;

/// 文档仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 回退链耗尽 =====
    #[error("数据源不可用 (source={source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    // ===== 网络错误 =====
    #[error("HTTP 请求失败: {0}")]
    HttpError(String),

    #[error("HTTP 状态异常: url={url}, status={status}")]
    HttpStatus { url: String, status: u16 },

    // ===== 本地文件错误 =====
    #[error("本地文件读取失败 (path={path}): {message}")]
    FileReadError { path: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RepositoryError::HttpStatus {
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                status: status.as_u16(),
            },
            None => RepositoryError::HttpError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
