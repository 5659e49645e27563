// ==========================================
// 仓库库存驾驶舱 - 文档抓取
// ==========================================
// 职责: 按 URL 抓取原始文档字节（表格导出链接）
// 实现者: HttpDocumentFetcher；测试中用计数 mock 替换
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// 抓取文档
    ///
    /// # 返回
    /// - Ok(bytes): 2xx 响应体
    /// - Err: 连接失败 / 超时 / 非 2xx 状态
    async fn fetch(&self, url: &str) -> RepositoryResult<Vec<u8>>;
}

/// 基于 reqwest 的抓取器（带整体超时，自动跟随重定向）
pub struct HttpDocumentFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::InternalError(format!("HTTP 客户端构建失败: {}", e)))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> RepositoryResult<Vec<u8>> {
        tracing::debug!(url = %url, timeout_secs = self.timeout.as_secs(), "抓取文档");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_timeout() {
        let fetcher = HttpDocumentFetcher::new(Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_invalid_url_is_http_error() {
        let fetcher = HttpDocumentFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, RepositoryError::HttpError(_)));
    }
}
