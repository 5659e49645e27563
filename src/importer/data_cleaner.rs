// ==========================================
// 仓库库存驾驶舱 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 去重音 / 数值强转 / 哨兵值填充 / 日期解析
// 红线: 单元格级别的问题在此吸收，不向上传播
// ==========================================

use crate::domain::table::CellValue;
use crate::domain::types::MISSING_TEXT;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

// 日期优先按 日/月/年 解析
// 两位年份格式必须排在四位之前，否则 "03/04/24" 会被当成公元 24 年
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d",
];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// 视为"无值"的文本（pandas 导出残留）
const NULL_LIKE: &[&str] = &["nan", "none", "null", "n/a", "nat"];

pub struct DataCleaner;

impl DataCleaner {
    // ==========================================
    // 文本
    // ==========================================

    /// 小写 + 去除葡语重音，供关键词匹配使用
    pub fn fold(value: &str) -> String {
        value
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
                'é' | 'è' | 'ê' | 'ë' => 'e',
                'í' | 'ì' | 'î' | 'ï' => 'i',
                'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
                'ú' | 'ù' | 'û' | 'ü' => 'u',
                'ç' => 'c',
                other => other,
            })
            .collect()
    }

    /// 单元格文本，空值 / NaN 残留 → None
    pub fn text(cell: &CellValue) -> Option<String> {
        let text = cell.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() || NULL_LIKE.contains(&trimmed.to_lowercase().as_str()) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 单元格文本，缺失时使用给定哨兵值
    pub fn text_or(cell: &CellValue, sentinel: &str) -> String {
        Self::text(cell).unwrap_or_else(|| sentinel.to_string())
    }

    /// 深度字段：去掉数值强转带来的 ".0" 尾巴
    pub fn clean_depth(cell: &CellValue) -> String {
        match Self::text(cell) {
            None => MISSING_TEXT.to_string(),
            Some(v) => match v.strip_suffix(".0") {
                Some(stripped) if !stripped.is_empty() => stripped.to_string(),
                _ => v,
            },
        }
    }

    /// 共享托盘 ID：空 / "0" / "none" / "nan" 统一为空串（= 非共享）
    pub fn clean_shared_pallet_id(cell: &CellValue) -> String {
        match Self::text(cell) {
            None => String::new(),
            Some(v) => {
                let v = v.strip_suffix(".0").unwrap_or(&v).trim().to_string();
                if v.is_empty() || v == "0" {
                    String::new()
                } else {
                    v
                }
            }
        }
    }

    // ==========================================
    // 数值
    // ==========================================

    /// 非负数量：缺失 / 无法解析 / 非有限值 / 负数 → 0
    pub fn quantity(cell: &CellValue) -> f64 {
        let value = match cell {
            CellValue::Number(n) => *n,
            CellValue::Bool(_) | CellValue::Empty | CellValue::DateTime(_) => 0.0,
            CellValue::Text(s) => Self::parse_number(s).unwrap_or(0.0),
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }

    /// 文本 → 数值
    ///
    /// # 规则
    /// - 标准写法直接解析（"12.5"、"-3"）
    /// - 逗号小数（pt-BR）: "12,5"、"1.234,5"（点为千分位）
    /// - 逗号千分位（en）: "1,234.5"
    /// - 多个点且每段 3 位: "1.234.567" 视为千分位
    /// - 单个点保持小数含义（"1.234" → 1.234）
    pub fn parse_number(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Some(v);
        }

        let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => {
                trimmed.replace('.', "").replace(',', ".")
            }
            (Some(_), Some(_)) => trimmed.replace(',', ""),
            (Some(_), None) if trimmed.matches(',').count() == 1 => trimmed.replace(',', "."),
            (Some(_), None) => trimmed.replace(',', ""),
            (None, Some(_)) if Self::is_dot_grouped(trimmed) => trimmed.replace('.', ""),
            _ => return None,
        };
        normalized.parse::<f64>().ok()
    }

    // "1.234.567" / "-12.000.000"
    fn is_dot_grouped(s: &str) -> bool {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let mut groups = digits.split('.');
        let head_ok = groups
            .next()
            .is_some_and(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()));
        let rest: Vec<&str> = groups.collect();
        head_ok
            && rest.len() >= 2
            && rest
                .iter()
                .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
    }

    // ==========================================
    // 日期
    // ==========================================

    /// 解析流水日期
    ///
    /// # 规则
    /// 1. 单元格本身是日期时间 → 直接取日期
    /// 2. 文本按 日/月 优先的格式解析
    /// 3. 仅 "日/月"（无年份）→ 归入 today 所在年份
    /// 4. 其他 → None（由调用方决定回退策略）
    pub fn parse_date(cell: &CellValue, today: NaiveDate) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(s) => Self::parse_date_text(s, today),
            _ => None,
        }
    }

    fn parse_date_text(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        for fmt in DAY_FIRST_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return Some(date);
            }
        }
        for fmt in DAY_FIRST_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt.date());
            }
        }

        // 无年份的 "日/月"
        let parts: Vec<&str> = value.split(['/', '-', '.']).map(str::trim).collect();
        if parts.len() == 2 {
            let day = parts[0].parse::<u32>().ok()?;
            let month = parts[1].parse::<u32>().ok()?;
            return NaiveDate::from_ymd_opt(today.year(), month, day);
        }

        None
    }
}
