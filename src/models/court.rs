use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 法院选择器中的一个条目（courtPicker.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtPick {
    pub court: String,
}

/// 查找表中的一个条目（getLookupCodeDetails.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtDetail {
    pub fips_code4: String,
    pub court_name: String,
}

/// FIPS → 法院名称
#[derive(Debug, Clone, Default)]
pub struct CourtLookup {
    by_fips: HashMap<String, String>,
}

impl CourtLookup {
    pub fn new(details: Vec<CourtDetail>) -> Self {
        let mut by_fips = HashMap::with_capacity(details.len());
        for detail in details {
            // 重复的 FIPS 以第一条为准
            by_fips.entry(detail.fips_code4).or_insert(detail.court_name);
        }
        Self { by_fips }
    }

    pub fn court_name(&self, fips: &str) -> Option<&str> {
        self.by_fips.get(fips).map(String::as_str)
    }

    /// 找不到时报错
    pub fn require(&self, fips: &str) -> Result<&str, CatalogError> {
        self.court_name(fips).ok_or_else(|| CatalogError::UnknownCourt {
            fips: fips.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.by_fips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fips.is_empty()
    }
}
