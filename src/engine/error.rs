// ==========================================
// 仓库库存驾驶舱 - 管道错误类型
// ==========================================
// 说明: 同一文档可能供多个数据源共用，错误需可克隆后按数据源重新标注
// ==========================================

use crate::domain::types::SourceKind;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("数据源不可用 (source={source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("数据源解析失败 (source={source_name}): {reason}")]
    Malformed { source_name: String, reason: String },
}

impl PipelineError {
    pub fn from_import(kind: SourceKind, err: ImportError) -> Self {
        PipelineError::Malformed {
            source_name: kind.to_string(),
            reason: err.to_string(),
        }
    }

    /// 换成另一个数据源的名义（共用文档时）
    pub fn with_source(self, kind: SourceKind) -> Self {
        match self {
            PipelineError::SourceUnavailable { reason, .. } => PipelineError::SourceUnavailable {
                source_name: kind.to_string(),
                reason,
            },
            PipelineError::Malformed { reason, .. } => PipelineError::Malformed {
                source_name: kind.to_string(),
                reason,
            },
        }
    }
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::SourceUnavailable { source_name, reason } => {
                PipelineError::SourceUnavailable { source_name, reason }
            }
            other => PipelineError::SourceUnavailable {
                source_name: "unknown".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Result 类型别名
pub type PipelineResult<T> = Result<T, PipelineError>;
