// ==========================================
// 仓库库存驾驶舱 - 原始表格结构
// ==========================================
// 用途: 文件解析产物（xlsx/csv → 此结构 → 列映射 → 记录）
// 生命周期: 仅在单次请求的管道内
// ==========================================

use chrono::NaiveDateTime;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 单元格的文本形式（整数值不带 ".0"）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// ==========================================
// RawSheet - 单个工作表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// 按列索引取值，越界视为空
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    /// 某列的全部取值（行数不足的行视为空）
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// ==========================================
// RawWorkbook - 一个源文档（可含多个工作表）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawWorkbook {
    pub sheets: Vec<RawSheet>,
}

impl RawWorkbook {
    pub fn new(sheets: Vec<RawSheet>) -> Self {
        Self { sheets }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn first_sheet(&self) -> Option<&RawSheet> {
        self.sheets.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_as_text_drops_integral_fraction() {
        assert_eq!(CellValue::Number(3.0).as_text(), "3");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Text("  A01 ".to_string()).as_text(), "A01");
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let sheet = RawSheet::new(
            "s",
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(sheet.cell(0, 1), &CellValue::Empty);
        assert_eq!(sheet.cell(5, 0), &CellValue::Empty);
        assert_eq!(sheet.column(0).count(), 1);
    }
}
