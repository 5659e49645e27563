// ==========================================
// 仓库库存驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把管道错误转换为 HTTP 响应
// 响应体: {"detail": "<message>"}
// ==========================================

use crate::engine::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据源错误
    // ==========================================
    #[error("{0}")]
    SourceUnavailable(String),

    #[error("{0}")]
    ImportError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::SourceUnavailable(_) | ApiError::ImportError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// ==========================================
// 从 PipelineError 转换
// ==========================================
impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            e @ PipelineError::SourceUnavailable { .. } => ApiError::SourceUnavailable(e.to_string()),
            e @ PipelineError::Malformed { .. } => ApiError::ImportError(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "请求失败");
        } else {
            tracing::debug!(error = %self, "请求参数无效");
        }
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
