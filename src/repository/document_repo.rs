// ==========================================
// 仓库库存驾驶舱 - 文档仓储
// ==========================================
// 职责: 为单个数据源取得原始文档字节
// 回退链: 新鲜缓存 → 网络 → 过期缓存 → 本地文件 → SourceUnavailable
// 红线: 仓储层不解析文档、不含业务逻辑
// ==========================================

use crate::domain::types::SourceKind;
use crate::repository::document_cache::{DocumentCache, DocumentOrigin};
use crate::repository::document_fetcher::DocumentFetcher;
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 数据源位置（URL 与本地回退文件，二者皆可选）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

impl DocumentLocation {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.path.is_some()
    }

    /// 用于日志的简短描述
    pub fn describe(&self) -> String {
        match (&self.url, &self.path) {
            (Some(url), _) => url.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => "<未配置>".to_string(),
        }
    }
}

/// 取得的文档
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub bytes: Arc<[u8]>,
    pub origin: DocumentOrigin,
}

pub struct DocumentRepository {
    fetcher: Arc<dyn DocumentFetcher>,
    cache: Arc<DocumentCache>,
}

impl DocumentRepository {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, cache: Arc<DocumentCache>) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// 取文档
    ///
    /// # 参数
    /// - source: 数据源（仅用于日志与错误信息）
    /// - location: URL / 本地路径
    ///
    /// # 返回
    /// - Err(SourceUnavailable): 回退链全部失败，reason 汇总每一级的失败原因
    pub async fn load(
        &self,
        source: SourceKind,
        location: &DocumentLocation,
    ) -> RepositoryResult<FetchedDocument> {
        let mut reasons: Vec<String> = Vec::new();

        if let Some(url) = location.url.as_deref() {
            let fetcher = self.fetcher.clone();
            match self.cache.get_or_fetch(url, || async move { fetcher.fetch(url).await }).await {
                Ok((doc, origin)) => {
                    if origin == DocumentOrigin::StaleCache {
                        warn!(source = %source, url = %url, "使用过期缓存");
                    }
                    return Ok(FetchedDocument {
                        bytes: doc.bytes,
                        origin,
                    });
                }
                Err(e) => {
                    warn!(source = %source, url = %url, error = %e, "网络抓取失败，尝试本地文件");
                    reasons.push(e.to_string());
                }
            }
        }

        if let Some(path) = location.path.as_ref() {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    info!(source = %source, path = %path.display(), bytes = bytes.len(), "使用本地文件");
                    return Ok(FetchedDocument {
                        bytes: Arc::from(bytes),
                        origin: DocumentOrigin::LocalFile,
                    });
                }
                Err(e) => {
                    let err = RepositoryError::FileReadError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    };
                    warn!(source = %source, error = %err, "本地文件不可用");
                    reasons.push(err.to_string());
                }
            }
        }

        if reasons.is_empty() {
            reasons.push("未配置 URL 或本地路径".to_string());
        }

        Err(RepositoryError::SourceUnavailable {
            source_name: source.to_string(),
            reason: reasons.join("; "),
        })
    }
}
