// ==========================================
// 仓库库存驾驶舱 - 列映射器实现
// ==========================================
// 职责: 人工编写的表头（葡语/英语混用、缩写不一）→ 标准字段
// 规则: 有序 (谓词, 标准字段) 列表，逐条短路匹配，首个命中即生效
// 红线: 永不报错；未命中的表头保持未映射，由加载器默认填充
// ==========================================

use crate::domain::table::RawSheet;
use crate::domain::types::CanonicalField;
use crate::importer::data_cleaner::DataCleaner;

/// 单个表头的匹配视图
pub struct HeaderView<'a> {
    pub raw: &'a str,
    pub folded: &'a str,
    pub zone_prefix: &'a str,
}

impl HeaderView<'_> {
    fn has(&self, needle: &str) -> bool {
        self.folded.contains(needle)
    }

    fn has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.folded.contains(n))
    }

    fn has_token(&self, token: &str) -> bool {
        self.folded
            .split(|c: char| !c.is_alphanumeric())
            .any(|t| t == token)
    }

    fn has_pallet_word(&self) -> bool {
        self.has_any(&["palet", "pallet"])
    }
}

pub type HeaderPredicate = fn(&HeaderView<'_>) -> bool;

// ==========================================
// 匹配规则（顺序即优先级）
// ==========================================

fn is_position(h: &HeaderView<'_>) -> bool {
    h.has_any(&["posi", "endereco", "location"])
}

// 表头被误写成库位编码本身（例如 "G300-A01"）
fn starts_with_zone_prefix(h: &HeaderView<'_>) -> bool {
    !h.zone_prefix.is_empty()
        && h
            .raw
            .trim()
            .to_uppercase()
            .starts_with(&h.zone_prefix.to_uppercase())
}

fn is_a501(h: &HeaderView<'_>) -> bool {
    h.has("a501")
}

fn is_g501(h: &HeaderView<'_>) -> bool {
    h.has("g501")
}

fn is_date(h: &HeaderView<'_>) -> bool {
    h.has_any(&["data", "date"])
}

fn is_entries(h: &HeaderView<'_>) -> bool {
    h.has_any(&["entrada", "entry", "entries", "inbound"])
}

fn is_exits(h: &HeaderView<'_>) -> bool {
    h.has_any(&["saida", "exit", "outbound"])
}

fn is_origin(h: &HeaderView<'_>) -> bool {
    h.has_any(&["origem", "origin"])
}

fn is_description(h: &HeaderView<'_>) -> bool {
    h.has("descri")
}

fn is_product(h: &HeaderView<'_>) -> bool {
    h.has_any(&["produto", "sku", "product", "codigo", "material"])
}

fn is_capacity(h: &HeaderView<'_>) -> bool {
    h.has_any(&["capacidade", "capacity"])
}

// 必须先于托盘数量规则："Qtd / Palete" 不是托盘数
fn is_quantity_per_pallet(h: &HeaderView<'_>) -> bool {
    h.has_pallet_word() && (h.has("/") || h.has_any(&["por palete", "per pallet"]))
}

fn is_total_quantity(h: &HeaderView<'_>) -> bool {
    h.has_any(&["quantidade total", "total quantity"])
        || (h.has("total") && h.has_any(&["qtd", "qua", "quant", "qty"]))
}

fn is_pallet_count(h: &HeaderView<'_>) -> bool {
    if h.folded == "paletes" || h.folded == "pallets" {
        return true;
    }
    h.has_pallet_word() && h.has_any(&["qtd", "qua", "qty", "count", "num"]) && !h.has("/")
}

// "quantidade" 内含 "id"，所以按独立词匹配
fn is_shared_pallet_id(h: &HeaderView<'_>) -> bool {
    h.has_pallet_word() && h.has_token("id")
}

fn is_level(h: &HeaderView<'_>) -> bool {
    h.has_any(&["nivel", "level"])
}

fn is_depth(h: &HeaderView<'_>) -> bool {
    h.has_any(&["prof", "depth"])
}

fn is_tipped(h: &HeaderView<'_>) -> bool {
    h.has_any(&["tombad", "tipped"])
}

fn is_wet(h: &HeaderView<'_>) -> bool {
    h.has_any(&["molhad", "wet"])
}

fn is_observation(h: &HeaderView<'_>) -> bool {
    h.has_any(&["status", "observa", "avaria", "obs", "damage", "note"])
}

pub const COLUMN_RULES: &[(HeaderPredicate, CanonicalField)] = &[
    (is_position, CanonicalField::Position),
    (starts_with_zone_prefix, CanonicalField::Position),
    (is_a501, CanonicalField::A501Quantity),
    (is_g501, CanonicalField::G501Quantity),
    (is_date, CanonicalField::Date),
    (is_entries, CanonicalField::Entries),
    (is_exits, CanonicalField::Exits),
    (is_origin, CanonicalField::Origin),
    (is_description, CanonicalField::Description),
    (is_product, CanonicalField::Product),
    (is_capacity, CanonicalField::Capacity),
    (is_quantity_per_pallet, CanonicalField::QuantityPerPallet),
    (is_total_quantity, CanonicalField::TotalQuantity),
    (is_pallet_count, CanonicalField::PalletCount),
    (is_shared_pallet_id, CanonicalField::SharedPalletId),
    (is_level, CanonicalField::Level),
    (is_depth, CanonicalField::Depth),
    (is_tipped, CanonicalField::TippedDamageQty),
    (is_wet, CanonicalField::WetDamageQty),
    (is_observation, CanonicalField::Observation),
];

// ==========================================
// ColumnMapping - 映射结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    fields: Vec<Option<CanonicalField>>,
}

impl ColumnMapping {
    /// 某列映射到的标准字段（未映射 → None）
    pub fn field_of(&self, col: usize) -> Option<CanonicalField> {
        self.fields.get(col).copied().flatten()
    }

    /// 标准字段对应的列（多列命中同一字段时取第一列）
    pub fn column_of(&self, field: CanonicalField) -> Option<usize> {
        self.fields.iter().position(|f| *f == Some(field))
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.column_of(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 把某列提升为库位列，原库位列降为未映射
    fn promote_position(&mut self, col: usize) {
        for field in self.fields.iter_mut() {
            if *field == Some(CanonicalField::Position) {
                *field = None;
            }
        }
        if let Some(slot) = self.fields.get_mut(col) {
            *slot = Some(CanonicalField::Position);
        }
    }
}

// ==========================================
// ColumnMapper - 列映射器
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    zone_prefix: String,
}

impl ColumnMapper {
    /// # 参数
    /// - zone_prefix: 库区前缀（如 "G300"），用于兜底规则和内容嗅探
    pub fn new(zone_prefix: impl Into<String>) -> Self {
        Self {
            zone_prefix: zone_prefix.into(),
        }
    }

    pub fn zone_prefix(&self) -> &str {
        &self.zone_prefix
    }

    /// 单个表头 → 标准字段
    pub fn map_header(&self, raw: &str) -> Option<CanonicalField> {
        let folded = DataCleaner::fold(raw);
        let view = HeaderView {
            raw,
            folded: &folded,
            zone_prefix: &self.zone_prefix,
        };
        COLUMN_RULES
            .iter()
            .find(|(predicate, _)| predicate(&view))
            .map(|(_, field)| *field)
    }

    /// 仅按表头映射（不做内容嗅探）
    pub fn map_headers(&self, headers: &[String]) -> ColumnMapping {
        ColumnMapping {
            fields: headers.iter().map(|h| self.map_header(h)).collect(),
        }
    }

    /// 表头映射 + 库位列内容嗅探
    ///
    /// # 规则
    /// 若没有列映射到 position，或 position 列全部是 "N/A" 占位，
    /// 则逐列扫描取值，首个包含库区前缀的列提升为 position
    pub fn map_sheet(&self, sheet: &RawSheet) -> ColumnMapping {
        let mut mapping = self.map_headers(&sheet.headers);

        let needs_sniffing = match mapping.column_of(CanonicalField::Position) {
            None => true,
            Some(col) => sheet
                .column(col)
                .all(|cell| cell.as_text().to_uppercase().contains("N/A")),
        };
        if !needs_sniffing || self.zone_prefix.is_empty() {
            return mapping;
        }

        let prefix = self.zone_prefix.to_uppercase();
        let width = sheet
            .rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(sheet.headers.len());

        for col in 0..width {
            if sheet
                .column(col)
                .any(|cell| cell.as_text().to_uppercase().contains(&prefix))
            {
                tracing::debug!(sheet = %sheet.name, column = col, "内容嗅探命中库位列");
                if col >= mapping.fields.len() {
                    mapping.fields.resize(col + 1, None);
                }
                mapping.promote_position(col);
                break;
            }
        }

        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    fn mapper() -> ColumnMapper {
        ColumnMapper::new("G300")
    }

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_maps_portuguese_warehouse_headers() {
        let m = mapper();
        assert_eq!(m.map_header("Posição"), Some(CanonicalField::Position));
        assert_eq!(m.map_header("Produto"), Some(CanonicalField::Product));
        assert_eq!(m.map_header("SKU"), Some(CanonicalField::Product));
        assert_eq!(m.map_header("Capacidade"), Some(CanonicalField::Capacity));
        assert_eq!(m.map_header("Quantidade Total"), Some(CanonicalField::TotalQuantity));
        assert_eq!(m.map_header("Qtd Total"), Some(CanonicalField::TotalQuantity));
        assert_eq!(m.map_header("Qtd Paletes"), Some(CanonicalField::PalletCount));
        assert_eq!(m.map_header("Nível"), Some(CanonicalField::Level));
        assert_eq!(m.map_header("Profundidade"), Some(CanonicalField::Depth));
        assert_eq!(m.map_header("ID Palete"), Some(CanonicalField::SharedPalletId));
        assert_eq!(m.map_header("Qtd Tombada"), Some(CanonicalField::TippedDamageQty));
        assert_eq!(m.map_header("Qtd Molhado"), Some(CanonicalField::WetDamageQty));
        assert_eq!(m.map_header("Observação"), Some(CanonicalField::Observation));
        assert_eq!(m.map_header("Descrição"), Some(CanonicalField::Description));
    }

    #[test]
    fn test_quantity_per_pallet_checked_before_pallet_count() {
        let m = mapper();
        assert_eq!(
            m.map_header("Qtd / Palete"),
            Some(CanonicalField::QuantityPerPallet)
        );
        assert_eq!(
            m.map_header("Quantidade de Paletes"),
            Some(CanonicalField::PalletCount)
        );
    }

    #[test]
    fn test_movement_headers() {
        let m = mapper();
        assert_eq!(m.map_header("Data"), Some(CanonicalField::Date));
        assert_eq!(m.map_header("Entrada"), Some(CanonicalField::Entries));
        assert_eq!(m.map_header("Saída"), Some(CanonicalField::Exits));
        assert_eq!(m.map_header("Origem"), Some(CanonicalField::Origin));
        assert_eq!(m.map_header("Estoque A501"), Some(CanonicalField::A501Quantity));
        assert_eq!(m.map_header("G501"), Some(CanonicalField::G501Quantity));
    }

    #[test]
    fn test_zone_prefix_header_fallback_and_unmatched() {
        let m = mapper();
        assert_eq!(m.map_header("G300-A01"), Some(CanonicalField::Position));
        assert_eq!(m.map_header("Coluna1"), None);
        assert_eq!(m.map_header(""), None);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let m = mapper();
        let hs = headers(&["Posição", "Produto", "Qtd Paletes", "Foo", "Qtd / Palete"]);
        let first = m.map_headers(&hs);
        let second = m.map_headers(&hs);
        assert_eq!(first, second);
        assert_eq!(first.field_of(3), None);
        assert_eq!(first.column_of(CanonicalField::PalletCount), Some(2));
    }

    #[test]
    fn test_first_column_wins_for_duplicate_field() {
        let mapping = mapper().map_headers(&headers(&["Produto", "SKU"]));
        assert_eq!(mapping.column_of(CanonicalField::Product), Some(0));
    }

    #[test]
    fn test_content_sniffing_promotes_position_column() {
        let sheet = RawSheet::new(
            "alocados",
            headers(&["Coluna1", "Produto"]),
            vec![
                vec![CellValue::Text("G300-A01".into()), CellValue::Text("SKU1".into())],
                vec![CellValue::Text("G300-A02".into()), CellValue::Text("SKU2".into())],
            ],
        );
        let mapping = mapper().map_sheet(&sheet);
        assert_eq!(mapping.column_of(CanonicalField::Position), Some(0));
        assert_eq!(mapping.column_of(CanonicalField::Product), Some(1));
    }

    #[test]
    fn test_content_sniffing_replaces_placeholder_position_column() {
        let sheet = RawSheet::new(
            "alocados",
            headers(&["Posição", "Local", "Produto"]),
            vec![
                vec![
                    CellValue::Text("N/A".into()),
                    CellValue::Text("G300-B12".into()),
                    CellValue::Text("SKU1".into()),
                ],
            ],
        );
        let mapping = mapper().map_sheet(&sheet);
        assert_eq!(mapping.column_of(CanonicalField::Position), Some(1));
        assert_eq!(mapping.field_of(0), None);
    }
}
