// ==========================================
// 仓库库存驾驶舱 - 应用状态
// ==========================================
// 职责: 组装共享组件（配置 / 文档缓存 / 编排器 / API）
// 说明: 跨请求共享的只有原始字节缓存；解析结果每次请求重建
// ==========================================

use std::sync::Arc;

use crate::api::DashboardApi;
use crate::config::AppConfig;
use crate::engine::PipelineOrchestrator;
use crate::importer::{KeywordDamageClassifier, UniversalFileParser};
use crate::repository::{
    DocumentCache, DocumentFetcher, DocumentRepository, HttpDocumentFetcher, RepositoryResult,
};

/// 应用状态
///
/// axum 路由的共享状态（克隆成本为几个 Arc）
#[derive(Clone)]
pub struct AppState {
    /// 生效配置
    pub config: Arc<AppConfig>,

    /// 原始文档缓存
    pub cache: Arc<DocumentCache>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 使用 HTTP 抓取器创建
    pub fn new(config: AppConfig) -> RepositoryResult<Self> {
        let fetcher = HttpDocumentFetcher::new(config.fetch_timeout())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// 使用指定抓取器创建
    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        let config = Arc::new(config);
        let cache = Arc::new(DocumentCache::new(config.cache_ttl()));
        let repository = Arc::new(DocumentRepository::new(fetcher, cache.clone()));
        let classifier = KeywordDamageClassifier::with_overrides(
            &config.damage_keywords.wet,
            &config.damage_keywords.tipped,
        );

        let orchestrator = Arc::new(PipelineOrchestrator::new(
            config.clone(),
            repository,
            Arc::new(UniversalFileParser),
            Arc::new(classifier),
        ));

        tracing::info!(
            cache_ttl_secs = config.cache_ttl_secs,
            fetch_timeout_secs = config.fetch_timeout().as_secs(),
            position_prefix = %config.position_prefix,
            "应用状态初始化完成"
        );

        Self {
            config,
            cache,
            dashboard_api: Arc::new(DashboardApi::new(orchestrator)),
        }
    }
}
