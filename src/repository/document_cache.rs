// ==========================================
// 仓库库存驾驶舱 - 原始文档字节缓存
// ==========================================
// 职责: 跨请求共享的短时缓存（只缓存原始字节，不缓存解析结果）
// 并发: 读-检查-填充；同一 key 的并发未命中合并为一次抓取（single-flight）
//       已过期但存在的条目可直接返回，不阻塞等待
// ==========================================

use crate::repository::error::RepositoryResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// TTL 判定
///
/// # 规则
/// - now - fetched_at < ttl → 新鲜
/// - 时钟回拨（now 早于 fetched_at）视为刚抓取
pub fn is_fresh(fetched_at: Instant, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(fetched_at) < ttl
}

/// 缓存条目：(payload, fetched_at)
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub bytes: Arc<[u8]>,
    pub fetched_at: Instant,
}

/// 文档字节的实际来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    Cache,
    Network,
    StaleCache,
    LocalFile,
}

impl DocumentOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentOrigin::Cache => "cache",
            DocumentOrigin::Network => "network",
            DocumentOrigin::StaleCache => "stale_cache",
            DocumentOrigin::LocalFile => "local_file",
        }
    }
}

/// 缓存查询结果
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Fresh(CachedDocument),
    Stale(CachedDocument),
    Missing,
}

// ==========================================
// DocumentCache
// ==========================================
pub struct DocumentCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedDocument>>,
    // 每个 key 一把异步锁，持有者负责抓取
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn lookup(&self, key: &str) -> CacheLookup {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get(key) {
            Some(doc) if is_fresh(doc.fetched_at, self.ttl, Instant::now()) => {
                CacheLookup::Fresh(doc.clone())
            }
            Some(doc) => CacheLookup::Stale(doc.clone()),
            None => CacheLookup::Missing,
        }
    }

    pub fn store(&self, key: &str, bytes: Vec<u8>) -> CachedDocument {
        let doc = CachedDocument {
            bytes: Arc::from(bytes),
            fetched_at: Instant::now(),
        };
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_string(), doc.clone());
        doc
    }

    pub fn clear(&self) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.clear();
    }

    fn flight_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = match self.inflight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// 缓存优先取文档，未命中时抓取并回填
    ///
    /// # 流程
    /// 1. 新鲜条目 → 直接返回
    /// 2. 抢到抓取锁 → 再查一次 → 抓取 → 回填
    /// 3. 没抢到锁且有过期条目 → 返回过期条目，不等待
    /// 4. 没抢到锁且无条目 → 等待持有者完成后复查
    /// 5. 抓取失败但有过期条目 → 返回过期条目
    ///
    /// # 返回
    /// - Ok((文档, 来源))
    /// - Err: 抓取失败且无任何缓存条目
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> RepositoryResult<(CachedDocument, DocumentOrigin)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RepositoryResult<Vec<u8>>>,
    {
        let stale = match self.lookup(key) {
            CacheLookup::Fresh(doc) => {
                debug!(key = %key, "文档缓存命中");
                return Ok((doc, DocumentOrigin::Cache));
            }
            CacheLookup::Stale(doc) => Some(doc),
            CacheLookup::Missing => None,
        };

        let lock = self.flight_lock(key);
        let _guard = match lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                if let Some(doc) = &stale {
                    debug!(key = %key, "抓取进行中，返回过期条目");
                    return Ok((doc.clone(), DocumentOrigin::StaleCache));
                }
                let guard = lock.lock_owned().await;
                match self.lookup(key) {
                    CacheLookup::Fresh(doc) => return Ok((doc, DocumentOrigin::Cache)),
                    CacheLookup::Stale(doc) => return Ok((doc, DocumentOrigin::StaleCache)),
                    CacheLookup::Missing => guard,
                }
            }
        };

        // 持锁后复查：上一个持有者可能刚完成回填
        let stale = match self.lookup(key) {
            CacheLookup::Fresh(doc) => return Ok((doc, DocumentOrigin::Cache)),
            CacheLookup::Stale(doc) => Some(doc),
            CacheLookup::Missing => stale,
        };

        match fetch().await {
            Ok(bytes) => {
                debug!(key = %key, bytes = bytes.len(), "文档抓取完成，已回填缓存");
                Ok((self.store(key, bytes), DocumentOrigin::Network))
            }
            Err(e) => match stale {
                Some(doc) => {
                    warn!(key = %key, error = %e, "文档抓取失败，使用过期缓存");
                    Ok((doc, DocumentOrigin::StaleCache))
                }
                None => Err(e),
            },
        }
    }
}
