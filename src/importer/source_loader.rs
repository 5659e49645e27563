// ==========================================
// 仓库库存驾驶舱 - 数据源加载器
// ==========================================
// 职责: 工作表 → 固定字段记录（列映射 + 类型强转 + 默认填充）
// 流程: 映射 → 缺失字段记录日志 → 逐行构造记录
// 红线: 行级问题就地吸收，不丢行、不报错
// ==========================================

use crate::domain::inventory::{InventoryRecord, ProductDescription, RegisteredPosition};
use crate::domain::movement::MovementRecord;
use crate::domain::table::{CellValue, RawSheet};
use crate::domain::types::{
    CanonicalField, RecordSource, SourceKind, MISSING_TEXT, UNALLOCATED_POSITION,
    UNIDENTIFIED_PRODUCT,
};
use crate::importer::column_mapper::{ColumnMapper, ColumnMapping};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::DamageClassifier;
use chrono::NaiveDate;
use tracing::{debug, warn};

const EMPTY_CELL: &CellValue = &CellValue::Empty;

// 各数据源映射后必须具备的字段（缺失时默认填充）
const INVENTORY_REQUIRED: &[CanonicalField] = &[
    CanonicalField::Position,
    CanonicalField::Product,
    CanonicalField::TotalQuantity,
    CanonicalField::PalletCount,
    CanonicalField::Capacity,
    CanonicalField::Level,
    CanonicalField::Observation,
];

const POSITIONS_REQUIRED: &[CanonicalField] =
    &[CanonicalField::Position, CanonicalField::Capacity];

const DESCRIPTIONS_REQUIRED: &[CanonicalField] =
    &[CanonicalField::Product, CanonicalField::Description];

const MOVEMENTS_REQUIRED: &[CanonicalField] = &[
    CanonicalField::Date,
    CanonicalField::Product,
    CanonicalField::Entries,
    CanonicalField::Exits,
];

/// 已映射工作表的行访问器
struct MappedRows<'s> {
    sheet: &'s RawSheet,
    mapping: ColumnMapping,
}

impl<'s> MappedRows<'s> {
    fn new(sheet: &'s RawSheet, mapping: ColumnMapping, kind: SourceKind, required: &[CanonicalField]) -> Self {
        for field in required {
            if !mapping.has(*field) {
                debug!(source = %kind, sheet = %sheet.name, field = %field, "字段未识别，使用默认值填充");
            }
        }
        Self { sheet, mapping }
    }

    fn get(&self, row: usize, field: CanonicalField) -> &'s CellValue {
        match self.mapping.column_of(field) {
            Some(col) => self.sheet.cell(row, col),
            None => EMPTY_CELL,
        }
    }

    fn len(&self) -> usize {
        self.sheet.row_count()
    }
}

// ==========================================
// SourceLoader - 数据源加载器
// ==========================================
pub struct SourceLoader<'a> {
    mapper: &'a ColumnMapper,
    classifier: &'a dyn DamageClassifier,
}

impl<'a> SourceLoader<'a> {
    pub fn new(mapper: &'a ColumnMapper, classifier: &'a dyn DamageClassifier) -> Self {
        Self { mapper, classifier }
    }

    /// 已分配库位表
    pub fn load_allocated(&self, sheet: &RawSheet) -> Vec<InventoryRecord> {
        let rows = MappedRows::new(
            sheet,
            self.mapper.map_sheet(sheet),
            SourceKind::Allocated,
            INVENTORY_REQUIRED,
        );
        (0..rows.len())
            .map(|idx| self.inventory_row(&rows, idx, RecordSource::Allocated))
            .collect()
    }

    /// 未分配物品表
    ///
    /// # 红线
    /// - position 固定为 "unallocated"
    /// - capacity 固定为 0（无论源表是否带容量）
    pub fn load_unallocated(&self, sheet: &RawSheet) -> Vec<InventoryRecord> {
        let rows = MappedRows::new(
            sheet,
            self.mapper.map_headers(&sheet.headers),
            SourceKind::Unallocated,
            INVENTORY_REQUIRED,
        );
        (0..rows.len())
            .map(|idx| self.inventory_row(&rows, idx, RecordSource::Unallocated))
            .collect()
    }

    /// 库位主数据表（无库位编码的行跳过）
    pub fn load_positions(&self, sheet: &RawSheet) -> Vec<RegisteredPosition> {
        let rows = MappedRows::new(
            sheet,
            self.mapper.map_sheet(sheet),
            SourceKind::Positions,
            POSITIONS_REQUIRED,
        );

        let mut positions = Vec::with_capacity(rows.len());
        for idx in 0..rows.len() {
            let Some(position) = DataCleaner::text(rows.get(idx, CanonicalField::Position)) else {
                debug!(row = idx + 1, "库位主数据行缺少库位编码，跳过");
                continue;
            };
            positions.push(RegisteredPosition {
                position,
                capacity: DataCleaner::quantity(rows.get(idx, CanonicalField::Capacity)),
                level: DataCleaner::text_or(rows.get(idx, CanonicalField::Level), MISSING_TEXT),
                depth: DataCleaner::clean_depth(rows.get(idx, CanonicalField::Depth)),
            });
        }
        positions
    }

    /// 产品描述表（附带 A501 / G501 系统库存）
    pub fn load_descriptions(&self, sheet: &RawSheet) -> Vec<ProductDescription> {
        let rows = MappedRows::new(
            sheet,
            self.mapper.map_headers(&sheet.headers),
            SourceKind::Descriptions,
            DESCRIPTIONS_REQUIRED,
        );

        let mut descriptions = Vec::with_capacity(rows.len());
        for idx in 0..rows.len() {
            let Some(product) = DataCleaner::text(rows.get(idx, CanonicalField::Product)) else {
                continue;
            };
            descriptions.push(ProductDescription {
                product,
                description: DataCleaner::text_or(
                    rows.get(idx, CanonicalField::Description),
                    MISSING_TEXT,
                ),
                a501_quantity: DataCleaner::quantity(rows.get(idx, CanonicalField::A501Quantity)),
                g501_quantity: DataCleaner::quantity(rows.get(idx, CanonicalField::G501Quantity)),
            });
        }
        descriptions
    }

    /// 出入库流水表
    ///
    /// # 日期规则
    /// - 无法解析 / 缺失 → 记为 today，并标记 date_inferred（不丢行）
    pub fn load_movements(&self, sheet: &RawSheet, today: NaiveDate) -> Vec<MovementRecord> {
        let rows = MappedRows::new(
            sheet,
            self.mapper.map_headers(&sheet.headers),
            SourceKind::Movements,
            MOVEMENTS_REQUIRED,
        );

        let mut inferred = 0usize;
        let mut movements = Vec::with_capacity(rows.len());
        for idx in 0..rows.len() {
            let (date, date_inferred) =
                match DataCleaner::parse_date(rows.get(idx, CanonicalField::Date), today) {
                    Some(date) => (date, false),
                    None => {
                        inferred += 1;
                        (today, true)
                    }
                };

            movements.push(MovementRecord {
                date,
                date_inferred,
                product: DataCleaner::text_or(
                    rows.get(idx, CanonicalField::Product),
                    UNIDENTIFIED_PRODUCT,
                ),
                description: MISSING_TEXT.to_string(),
                entries: DataCleaner::quantity(rows.get(idx, CanonicalField::Entries)),
                exits: DataCleaner::quantity(rows.get(idx, CanonicalField::Exits)),
                origin: DataCleaner::text_or(rows.get(idx, CanonicalField::Origin), MISSING_TEXT),
                wet_qty: DataCleaner::quantity(rows.get(idx, CanonicalField::WetDamageQty)),
                row_number: idx + 1,
            });
        }

        if inferred > 0 {
            warn!(sheet = %sheet.name, rows = inferred, "流水日期无法解析，已按当天记录");
        }
        movements
    }

    fn inventory_row(&self, rows: &MappedRows<'_>, idx: usize, source: RecordSource) -> InventoryRecord {
        let mut record = InventoryRecord::empty(source);

        record.position = match source {
            RecordSource::Unallocated => UNALLOCATED_POSITION.to_string(),
            _ => DataCleaner::text_or(rows.get(idx, CanonicalField::Position), MISSING_TEXT),
        };
        record.product =
            DataCleaner::text_or(rows.get(idx, CanonicalField::Product), UNIDENTIFIED_PRODUCT);
        record.description =
            DataCleaner::text_or(rows.get(idx, CanonicalField::Description), MISSING_TEXT);

        record.total_quantity = DataCleaner::quantity(rows.get(idx, CanonicalField::TotalQuantity));
        record.pallet_count = DataCleaner::quantity(rows.get(idx, CanonicalField::PalletCount));
        record.capacity = match source {
            RecordSource::Unallocated => 0.0,
            _ => DataCleaner::quantity(rows.get(idx, CanonicalField::Capacity)),
        };
        record.quantity_per_pallet =
            DataCleaner::quantity(rows.get(idx, CanonicalField::QuantityPerPallet));

        record.level = DataCleaner::text_or(rows.get(idx, CanonicalField::Level), MISSING_TEXT);
        record.depth = DataCleaner::clean_depth(rows.get(idx, CanonicalField::Depth));
        record.shared_pallet_id =
            DataCleaner::clean_shared_pallet_id(rows.get(idx, CanonicalField::SharedPalletId));

        record.wet_damage_qty = DataCleaner::quantity(rows.get(idx, CanonicalField::WetDamageQty));
        record.tipped_damage_qty =
            DataCleaner::quantity(rows.get(idx, CanonicalField::TippedDamageQty));
        record.observation =
            DataCleaner::text(rows.get(idx, CanonicalField::Observation)).unwrap_or_default();

        let damage_text = format!("{} {}", record.product, record.observation);
        record.is_wet_flag = self.classifier.is_wet(&damage_text) || record.wet_damage_qty > 0.0;
        record.is_tipped_flag =
            self.classifier.is_tipped(&damage_text) || record.tipped_damage_qty > 0.0;

        record
    }
}
