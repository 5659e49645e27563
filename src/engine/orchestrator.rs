// ==========================================
// 仓库库存驾驶舱 - 管道编排器
// ==========================================
// 流程: 抓取文档（并发）→ 解析 → 选表 → 加载 → 对账 → 托盘平衡 → 占用率
// 红线: 所有抓取完成（或回退耗尽）后才开始对账
//       只有 allocated 为必需数据源，其余失败时降级为空
// ==========================================

use crate::config::AppConfig;
use crate::domain::inventory::{InventoryRecord, ProductDescription, RegisteredPosition};
use crate::domain::movement::MovementRecord;
use crate::domain::table::{RawSheet, RawWorkbook};
use crate::domain::types::SourceKind;
use crate::engine::error::{PipelineError, PipelineResult};
use crate::engine::metrics::MetricsEngine;
use crate::engine::pallet_balancer::PalletBalancer;
use crate::engine::reconciler::{description_index, Reconciler};
use crate::importer::{ColumnMapper, DamageClassifier, FileParser, SheetSelector, SourceLoader};
use crate::perf::PerfGuard;
use crate::repository::{DocumentLocation, DocumentRepository};
use chrono::{Local, NaiveDate, NaiveDateTime};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// LoadedSources - 加载结果（对账前）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    pub allocated: Vec<InventoryRecord>,
    pub unallocated: Vec<InventoryRecord>,
    pub positions: Vec<RegisteredPosition>,
    pub descriptions: Vec<ProductDescription>,
    pub movements: Vec<MovementRecord>,
    pub degraded: Vec<SourceKind>, // 降级为空的数据源
}

// ==========================================
// PipelineSnapshot - 单次请求的管道输出
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub run_id: String,
    pub generated_at: NaiveDateTime,
    pub today: NaiveDate,
    pub records: Vec<InventoryRecord>,
    pub movements: Vec<MovementRecord>,
    pub descriptions: Vec<ProductDescription>,
    pub degraded_sources: Vec<SourceKind>,
}

impl PipelineSnapshot {
    /// 产品 → 描述
    pub fn description_index(&self) -> HashMap<&str, &str> {
        description_index(&self.descriptions)
    }
}

/// 对账 → 平衡 → 占用率（纯计算，无 I/O）
pub fn assemble(run_id: String, today: NaiveDate, loaded: LoadedSources) -> PipelineSnapshot {
    let LoadedSources {
        allocated,
        unallocated,
        positions,
        descriptions,
        mut movements,
        degraded,
    } = loaded;

    let mut records = {
        let _perf = PerfGuard::new("reconcile");
        Reconciler::new().reconcile(allocated, &positions, unallocated, &descriptions)
    };

    {
        let _perf = PerfGuard::new("balance");
        PalletBalancer::new().apply(&mut records);
        MetricsEngine::new().apply_occupancy(&mut records);
    }

    {
        let index = description_index(&descriptions);
        for movement in movements.iter_mut() {
            if let Some(description) = index.get(movement.product.as_str()) {
                movement.description = description.to_string();
            }
        }
    }

    PipelineSnapshot {
        run_id,
        generated_at: Local::now().naive_local(),
        today,
        records,
        movements,
        descriptions,
        degraded_sources: degraded,
    }
}

// ==========================================
// PipelineOrchestrator - 管道编排器
// ==========================================
pub struct PipelineOrchestrator {
    config: Arc<AppConfig>,
    repository: Arc<DocumentRepository>,
    parser: Arc<dyn FileParser>,
    classifier: Arc<dyn DamageClassifier>,
    mapper: ColumnMapper,
}

impl PipelineOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 数据源位置 / 表名 / 库区前缀
    /// - repository: 文档仓储（缓存 + 回退链）
    /// - parser: 文档解析器
    /// - classifier: 损坏分类器
    pub fn new(
        config: Arc<AppConfig>,
        repository: Arc<DocumentRepository>,
        parser: Arc<dyn FileParser>,
        classifier: Arc<dyn DamageClassifier>,
    ) -> Self {
        let mapper = ColumnMapper::new(config.position_prefix.clone());
        Self {
            config,
            repository,
            parser,
            classifier,
            mapper,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 执行一次完整管道
    ///
    /// # 返回
    /// - Err: allocated 数据源不可用或无法解析
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run(&self, today: NaiveDate) -> PipelineResult<PipelineSnapshot> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        let _perf = PerfGuard::new("pipeline");

        let workbooks = {
            let _perf = PerfGuard::new("fetch");
            self.fetch_workbooks().await
        };
        let loaded = {
            let _perf = PerfGuard::new("load");
            self.load_sources(&workbooks, today)?
        };
        if !loaded.degraded.is_empty() {
            warn!(degraded = ?loaded.degraded, "部分数据源降级为空");
        }

        let snapshot = assemble(run_id, today, loaded);
        info!(
            records = snapshot.records.len(),
            movements = snapshot.movements.len(),
            "管道执行完成"
        );
        Ok(snapshot)
    }

    /// 抓取并解析所有数据源文档
    ///
    /// 位置相同的数据源共用一次抓取与解析
    async fn fetch_workbooks(&self) -> HashMap<SourceKind, PipelineResult<Arc<RawWorkbook>>> {
        let mut groups: Vec<(DocumentLocation, Vec<SourceKind>)> = Vec::new();
        for kind in SourceKind::ALL {
            let location = self.config.source_location(kind);
            match groups.iter_mut().find(|(l, _)| *l == location) {
                Some((_, kinds)) => kinds.push(kind),
                None => groups.push((location, vec![kind])),
            }
        }

        let results = join_all(
            groups
                .iter()
                .map(|(location, kinds)| self.fetch_workbook(kinds[0], location)),
        )
        .await;

        let mut workbooks = HashMap::with_capacity(SourceKind::ALL.len());
        for ((_, kinds), result) in groups.iter().zip(results) {
            for kind in kinds {
                let entry = match &result {
                    Ok(workbook) => Ok(workbook.clone()),
                    Err(e) => Err(e.clone().with_source(*kind)),
                };
                workbooks.insert(*kind, entry);
            }
        }
        workbooks
    }

    async fn fetch_workbook(
        &self,
        kind: SourceKind,
        location: &DocumentLocation,
    ) -> PipelineResult<Arc<RawWorkbook>> {
        let document = self.repository.load(kind, location).await?;
        let workbook = self
            .parser
            .parse_document(kind.as_str(), &document.bytes)
            .map_err(|e| PipelineError::from_import(kind, e))?;
        info!(
            source = %kind,
            origin = document.origin.as_str(),
            bytes = document.bytes.len(),
            sheets = workbook.sheets.len(),
            "文档已解析"
        );
        Ok(Arc::new(workbook))
    }

    /// 选表 + 加载
    ///
    /// # 返回
    /// - Err: 仅当 allocated 无法取得工作表
    pub fn load_sources(
        &self,
        workbooks: &HashMap<SourceKind, PipelineResult<Arc<RawWorkbook>>>,
        today: NaiveDate,
    ) -> PipelineResult<LoadedSources> {
        let selector = SheetSelector::new(&self.mapper);
        let loader = SourceLoader::new(&self.mapper, self.classifier.as_ref());
        let mut loaded = LoadedSources::default();

        for kind in SourceKind::ALL {
            let Some(sheet) = self.pick_sheet(&selector, workbooks, kind)? else {
                loaded.degraded.push(kind);
                continue;
            };

            let rows = match kind {
                SourceKind::Allocated => {
                    loaded.allocated = loader.load_allocated(sheet);
                    loaded.allocated.len()
                }
                SourceKind::Unallocated => {
                    loaded.unallocated = loader.load_unallocated(sheet);
                    loaded.unallocated.len()
                }
                SourceKind::Positions => {
                    loaded.positions = loader.load_positions(sheet);
                    loaded.positions.len()
                }
                SourceKind::Descriptions => {
                    loaded.descriptions = loader.load_descriptions(sheet);
                    loaded.descriptions.len()
                }
                SourceKind::Movements => {
                    loaded.movements = loader.load_movements(sheet, today);
                    loaded.movements.len()
                }
            };
            info!(source = %kind, sheet = %sheet.name, rows, "数据源已加载");
        }

        Ok(loaded)
    }

    fn pick_sheet<'w>(
        &self,
        selector: &SheetSelector<'_>,
        workbooks: &'w HashMap<SourceKind, PipelineResult<Arc<RawWorkbook>>>,
        kind: SourceKind,
    ) -> PipelineResult<Option<&'w RawSheet>> {
        let required = kind == SourceKind::Allocated;

        let workbook = match workbooks.get(&kind) {
            Some(Ok(workbook)) => workbook,
            Some(Err(e)) => {
                if required {
                    return Err(e.clone());
                }
                warn!(source = %kind, error = %e, "数据源不可用，降级为空");
                return Ok(None);
            }
            None => {
                if required {
                    return Err(PipelineError::SourceUnavailable {
                        source_name: kind.to_string(),
                        reason: "未抓取".to_string(),
                    });
                }
                return Ok(None);
            }
        };

        let exclusive = !self.shares_document(kind);
        match selector.select(workbook, kind, self.config.sheet_name(kind), exclusive) {
            Ok(sheet) => Ok(Some(sheet)),
            Err(e) if required => Err(PipelineError::from_import(kind, e)),
            Err(e) => {
                warn!(source = %kind, exclusive, error = %e, "文档中没有该数据源的工作表，降级为空");
                Ok(None)
            }
        }
    }

    /// 是否与其他数据源共用同一文档位置
    pub fn shares_document(&self, kind: SourceKind) -> bool {
        let location = self.config.source_location(kind);
        SourceKind::ALL
            .iter()
            .any(|other| *other != kind && self.config.source_location(*other) == location)
    }
}
