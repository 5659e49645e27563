// ==========================================
// 仓库库存驾驶舱 - 损坏分类器实现
// ==========================================
// 职责: is_wet_flag / is_tipped_flag 的文本判定部分
// 规则: 产品 + 备注 文本（小写去重音）包含词干即命中
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::DamageClassifier;

pub const DEFAULT_WET_STEMS: &[&str] = &["molhad", "wet"];
pub const DEFAULT_TIPPED_STEMS: &[&str] = &["tombad", "tipped"];

pub struct KeywordDamageClassifier {
    wet_stems: Vec<String>,
    tipped_stems: Vec<String>,
}

impl KeywordDamageClassifier {
    pub fn new(wet_stems: Vec<String>, tipped_stems: Vec<String>) -> Self {
        Self {
            wet_stems: wet_stems.iter().map(|s| DataCleaner::fold(s)).collect(),
            tipped_stems: tipped_stems.iter().map(|s| DataCleaner::fold(s)).collect(),
        }
    }

    /// 配置的词干为空时沿用内置词干
    pub fn with_overrides(wet_stems: &[String], tipped_stems: &[String]) -> Self {
        let pick = |custom: &[String], defaults: &[&str]| -> Vec<String> {
            if custom.is_empty() {
                defaults.iter().map(|s| s.to_string()).collect()
            } else {
                custom.to_vec()
            }
        };
        Self::new(
            pick(wet_stems, DEFAULT_WET_STEMS),
            pick(tipped_stems, DEFAULT_TIPPED_STEMS),
        )
    }

    fn contains_any(text: &str, stems: &[String]) -> bool {
        let folded = DataCleaner::fold(text);
        stems.iter().any(|stem| !stem.is_empty() && folded.contains(stem.as_str()))
    }
}

impl Default for KeywordDamageClassifier {
    /// 葡语词干 + 英语对应词
    fn default() -> Self {
        Self::with_overrides(&[], &[])
    }
}

impl DamageClassifier for KeywordDamageClassifier {
    fn is_wet(&self, text: &str) -> bool {
        Self::contains_any(text, &self.wet_stems)
    }

    fn is_tipped(&self, text: &str) -> bool {
        Self::contains_any(text, &self.tipped_stems)
    }
}
