// ==========================================
// 仓库库存驾驶舱 - 文件解析器实现
// ==========================================
// 阶段 0: 原始字节解析为 RawWorkbook
// 支持: Excel (.xlsx) / CSV
// ==========================================

use crate::domain::table::{CellValue, RawSheet, RawWorkbook};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{Data, DataType, Reader, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;

// ZIP 魔数（xlsx 本质是 zip 包）
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_document(&self, document_name: &str, bytes: &[u8]) -> ImportResult<RawWorkbook> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyDocument(document_name.to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    let trimmed = value.trim_start_matches('\u{feff}').trim();
                    if trimmed.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(trimmed.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        let sheet = build_sheet(document_name, rows)
            .ok_or_else(|| ImportError::EmptyDocument(document_name.to_string()))?;
        Ok(RawWorkbook::new(vec![sheet]))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_document(&self, document_name: &str, bytes: &[u8]) -> ImportResult<RawWorkbook> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(format!(
                "Excel 文件无工作表: {}",
                document_name
            )));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name)?;
            let rows: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect();

            match build_sheet(&sheet_name, rows) {
                Some(sheet) => sheets.push(sheet),
                None => tracing::debug!(sheet = %sheet_name, "跳过空白工作表"),
            }
        }

        if sheets.is_empty() {
            return Err(ImportError::EmptyDocument(document_name.to_string()));
        }
        Ok(RawWorkbook::new(sheets))
    }
}

/// calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.trim().to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// 首个非空行作为表头，其后的非空行作为数据行
fn build_sheet(name: &str, rows: Vec<Vec<CellValue>>) -> Option<RawSheet> {
    let mut iter = rows
        .into_iter()
        .filter(|row| !row.iter().all(CellValue::is_empty));

    let header_row = iter.next()?;
    let headers: Vec<String> = header_row.iter().map(CellValue::as_text).collect();
    let data_rows: Vec<Vec<CellValue>> = iter.collect();

    Some(RawSheet::new(name, headers, data_rows))
}

// ==========================================
// 通用文件解析器（根据内容自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 是否为 xlsx（zip 包）
    pub fn looks_like_xlsx(bytes: &[u8]) -> bool {
        bytes.starts_with(ZIP_MAGIC)
    }
}

impl FileParser for UniversalFileParser {
    fn parse_document(&self, document_name: &str, bytes: &[u8]) -> ImportResult<RawWorkbook> {
        if Self::looks_like_xlsx(bytes) {
            ExcelParser.parse_document(document_name, bytes)
        } else {
            CsvParser.parse_document(document_name, bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_valid_document() {
        let csv = "Posição,Produto,Qtd Paletes\nG300-A01,SKU1,4\nG300-A02,SKU2,2\n";
        let workbook = CsvParser.parse_document("allocated", csv.as_bytes()).unwrap();

        assert_eq!(workbook.sheets.len(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "allocated");
        assert_eq!(sheet.headers, vec!["Posição", "Produto", "Qtd Paletes"]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.cell(0, 1), &CellValue::Text("SKU1".to_string()));
    }

    #[test]
    fn test_csv_parser_skips_leading_and_blank_rows() {
        let csv = ",,\nPosição,Produto\nA01,SKU1\n,\nA02,SKU2\n";
        let workbook = CsvParser.parse_document("s", csv.as_bytes()).unwrap();
        let sheet = &workbook.sheets[0];

        assert_eq!(sheet.headers, vec!["Posição", "Produto"]);
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_csv_parser_empty_document() {
        assert!(matches!(
            CsvParser.parse_document("s", b""),
            Err(ImportError::EmptyDocument(_))
        ));
    }

    #[test]
    fn test_universal_parser_falls_back_to_csv() {
        let workbook = UniversalFileParser
            .parse_document("mov", "Data,Produto\n28/02,SKU1\n".as_bytes())
            .unwrap();
        assert_eq!(workbook.sheets[0].headers, vec!["Data", "Produto"]);
    }

    #[test]
    fn test_invalid_zip_reports_excel_error() {
        let result = UniversalFileParser.parse_document("broken", b"PK\x03\x04not-a-zip");
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }
}
