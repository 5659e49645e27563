// ==========================================
// 仓库库存驾驶舱 - 工作表选择
// ==========================================
// 职责: 一个源文档含多个工作表时，选出该数据源对应的表
// 红线: 共享文档中，非 allocated 数据源不得回退到别的数据源的表
// ==========================================

use crate::domain::table::{RawSheet, RawWorkbook};
use crate::domain::types::{CanonicalField, SourceKind};
use crate::importer::column_mapper::ColumnMapper;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};

// 名称命中已知流水表名时的加分（压过任何行数差异）
const KNOWN_NAME_BONUS: usize = 1_000_000;

pub struct SheetSelector<'a> {
    mapper: &'a ColumnMapper,
}

impl<'a> SheetSelector<'a> {
    pub fn new(mapper: &'a ColumnMapper) -> Self {
        Self { mapper }
    }

    /// 通用选择（库存 / 库位 / 描述表）
    ///
    /// # 参数
    /// - exclusive: 该文档只供这一个数据源使用
    ///
    /// # 规则
    /// 1. 配置了表名：精确匹配，其次忽略大小写与重音匹配
    /// 2. 表名包含该数据源的名称提示
    /// 3. 第一个工作表：仅限 allocated，或独占文档
    ///
    /// # 返回
    /// - Err(SheetNotFound): 共享文档中没有属于该数据源的表
    pub fn select<'w>(
        &self,
        workbook: &'w RawWorkbook,
        kind: SourceKind,
        configured: Option<&str>,
        exclusive: bool,
    ) -> ImportResult<&'w RawSheet> {
        if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
            if let Some(sheet) = workbook.sheets.iter().find(|s| s.name == name) {
                return Ok(sheet);
            }
            let folded = DataCleaner::fold(name);
            if let Some(sheet) = workbook
                .sheets
                .iter()
                .find(|s| DataCleaner::fold(&s.name) == folded)
            {
                return Ok(sheet);
            }
            tracing::warn!(source = %kind, sheet = %name, "配置的工作表不存在，改用启发式选择");
        }

        let chosen = if kind == SourceKind::Movements {
            self.select_movements(workbook, exclusive)
        } else {
            let by_name = workbook
                .sheets
                .iter()
                .find(|s| Self::name_matches(&s.name, kind));
            let may_fall_back = kind == SourceKind::Allocated || exclusive;
            by_name.or_else(|| workbook.first_sheet().filter(|_| may_fall_back))
        };

        chosen.ok_or_else(|| ImportError::SheetNotFound(kind.to_string()))
    }

    /// 流水表选择
    ///
    /// # 打分
    /// - 资格: 同时有产品列和入库/出库列之一
    /// - 分数: 行数 + 已知表名加分
    /// - 无合格表且文档独占 → 第一个含产品列的表 → 第一个表
    /// - 无合格表且文档共享 → None（库存表不能当流水表）
    pub fn select_movements<'w>(
        &self,
        workbook: &'w RawWorkbook,
        exclusive: bool,
    ) -> Option<&'w RawSheet> {
        let mut best: Option<(usize, &RawSheet)> = None;

        for sheet in &workbook.sheets {
            let mapping = self.mapper.map_headers(&sheet.headers);
            let has_product = mapping.has(CanonicalField::Product);
            let has_flow =
                mapping.has(CanonicalField::Entries) || mapping.has(CanonicalField::Exits);
            if !(has_product && has_flow) {
                continue;
            }

            let mut score = sheet.row_count();
            if Self::name_matches(&sheet.name, SourceKind::Movements) {
                score += KNOWN_NAME_BONUS;
            }
            tracing::debug!(sheet = %sheet.name, score, "流水表候选");

            // 同分保留先出现的表
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, sheet));
            }
        }

        if let Some((_, sheet)) = best {
            return Some(sheet);
        }
        if !exclusive {
            return workbook
                .sheets
                .iter()
                .find(|s| Self::name_matches(&s.name, SourceKind::Movements));
        }

        workbook
            .sheets
            .iter()
            .find(|s| {
                self.mapper
                    .map_headers(&s.headers)
                    .has(CanonicalField::Product)
            })
            .or_else(|| workbook.first_sheet())
    }

    fn name_matches(name: &str, kind: SourceKind) -> bool {
        let folded = DataCleaner::fold(name);
        let hit = |k: SourceKind| k.sheet_hints().iter().any(|hint| folded.contains(hint));
        // "Não Alocados" 同样包含 "alocad"
        match kind {
            SourceKind::Allocated => hit(kind) && !hit(SourceKind::Unallocated),
            _ => hit(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    fn sheet(name: &str, headers: &[&str], rows: usize) -> RawSheet {
        RawSheet::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            (0..rows)
                .map(|i| vec![CellValue::Text(format!("v{}", i))])
                .collect(),
        )
    }

    fn name_of(result: ImportResult<&RawSheet>) -> String {
        result.map(|s| s.name.clone()).unwrap_or_default()
    }

    #[test]
    fn test_movements_prefers_known_name_over_row_count() {
        let workbook = RawWorkbook::new(vec![
            sheet("Planilha1", &["Produto", "Entrada", "Saída"], 500),
            sheet("Registro", &["Produto", "Entrada"], 3),
        ]);
        let mapper = ColumnMapper::new("G300");
        let chosen = SheetSelector::new(&mapper)
            .select_movements(&workbook, false)
            .unwrap();
        assert_eq!(chosen.name, "Registro");
    }

    #[test]
    fn test_movements_scores_by_row_count() {
        let workbook = RawWorkbook::new(vec![
            sheet("A", &["Produto", "Saída"], 2),
            sheet("B", &["Produto", "Entrada"], 10),
            sheet("C", &["Posição", "Capacidade"], 99),
        ]);
        let mapper = ColumnMapper::new("G300");
        let chosen = SheetSelector::new(&mapper)
            .select_movements(&workbook, false)
            .unwrap();
        assert_eq!(chosen.name, "B");
    }

    #[test]
    fn test_movements_fallbacks_for_exclusive_document() {
        let mapper = ColumnMapper::new("G300");
        let selector = SheetSelector::new(&mapper);

        let workbook = RawWorkbook::new(vec![
            sheet("X", &["Posição"], 1),
            sheet("Y", &["Produto"], 1),
        ]);
        assert_eq!(selector.select_movements(&workbook, true).unwrap().name, "Y");

        let workbook = RawWorkbook::new(vec![sheet("X", &["Posição"], 1)]);
        assert_eq!(selector.select_movements(&workbook, true).unwrap().name, "X");

        assert!(selector.select_movements(&RawWorkbook::default(), true).is_none());
    }

    #[test]
    fn test_movements_shared_document_without_flow_columns() {
        let mapper = ColumnMapper::new("G300");
        let selector = SheetSelector::new(&mapper);

        // 只有库存表：不能被当作流水表
        let workbook = RawWorkbook::new(vec![sheet(
            "Alocados",
            &["Posição", "Produto", "Quantidade Total"],
            4,
        )]);
        assert!(selector.select_movements(&workbook, false).is_none());
        assert!(matches!(
            selector.select(&workbook, SourceKind::Movements, None, false),
            Err(ImportError::SheetNotFound(_))
        ));

        // 名称命中流水表时仍可选中
        let workbook = RawWorkbook::new(vec![
            sheet("Alocados", &["Posição", "Produto"], 4),
            sheet("Registro", &["Produto", "Data"], 2),
        ]);
        assert_eq!(
            selector.select_movements(&workbook, false).unwrap().name,
            "Registro"
        );
    }

    #[test]
    fn test_configured_name_and_hints() {
        let workbook = RawWorkbook::new(vec![
            sheet("Não Alocados", &["Produto"], 1),
            sheet("Alocados", &["Posição"], 1),
            sheet("Cadastro Posições", &["Posição"], 1),
        ]);
        let mapper = ColumnMapper::new("G300");
        let selector = SheetSelector::new(&mapper);

        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Allocated, None, false)),
            "Alocados"
        );
        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Unallocated, None, false)),
            "Não Alocados"
        );
        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Positions, None, false)),
            "Cadastro Posições"
        );
        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Allocated, Some("alocados"), false)),
            "Alocados"
        );
        assert_eq!(
            name_of(selector.select(
                &workbook,
                SourceKind::Descriptions,
                Some("Cadastro Posições"),
                false
            )),
            "Cadastro Posições"
        );
    }

    #[test]
    fn test_shared_document_without_hint_is_not_found() {
        let workbook = RawWorkbook::new(vec![
            sheet("Planilha1", &["Posição", "Produto"], 4),
            sheet("Não Alocados", &["Produto"], 1),
        ]);
        let mapper = ColumnMapper::new("G300");
        let selector = SheetSelector::new(&mapper);

        assert!(matches!(
            selector.select(&workbook, SourceKind::Descriptions, None, false),
            Err(ImportError::SheetNotFound(_))
        ));
        assert!(matches!(
            selector.select(&workbook, SourceKind::Positions, None, false),
            Err(ImportError::SheetNotFound(_))
        ));
        // allocated 始终可回退到第一个表
        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Allocated, None, false)),
            "Planilha1"
        );
    }

    #[test]
    fn test_exclusive_document_falls_back_to_first_sheet() {
        let workbook = RawWorkbook::new(vec![sheet("descricoes.csv", &["Produto"], 1)]);
        let mapper = ColumnMapper::new("G300");
        let selector = SheetSelector::new(&mapper);

        assert_eq!(
            name_of(selector.select(&workbook, SourceKind::Positions, None, true)),
            "descricoes.csv"
        );
        assert!(matches!(
            selector.select(&RawWorkbook::default(), SourceKind::Allocated, None, true),
            Err(ImportError::SheetNotFound(_))
        ));
    }
}
