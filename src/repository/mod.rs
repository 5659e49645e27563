// ==========================================
// 仓库库存驾驶舱 - 文档仓储层
// ==========================================
// 红线: Repository 不含业务逻辑，不解析文档
// ==========================================
// 职责: 原始文档字节的抓取、短时缓存与逐级回退
// ==========================================

pub mod document_cache;
pub mod document_fetcher;
pub mod document_repo;
pub mod error;

// 重导出核心类型
pub use document_cache::{is_fresh, CacheLookup, CachedDocument, DocumentCache, DocumentOrigin};
pub use document_fetcher::{DocumentFetcher, HttpDocumentFetcher};
pub use document_repo::{DocumentLocation, DocumentRepository, FetchedDocument};
pub use error::{RepositoryError, RepositoryResult};
