//! 法条过滤 - 业务能力层

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::models::CaseSummary;

/// 过滤配置文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFilter {
    pub code_sections: Vec<String>,
}

impl CodeFilter {
    pub fn new(code_sections: Vec<String>) -> Self {
        Self { code_sections }
    }

    pub fn is_empty(&self) -> bool {
        self.code_sections.is_empty()
    }

    /// codeSection 包含任意一个过滤条件即保留
    pub fn matches(&self, case: &CaseSummary) -> bool {
        self.code_sections
            .iter()
            .any(|filter| case.code_section.contains(filter.as_str()))
    }

    /// 空过滤条件保留全部
    pub fn apply(&self, cases: Vec<CaseSummary>) -> Vec<CaseSummary> {
        if self.is_empty() {
            return cases;
        }
        cases.into_iter().filter(|case| self.matches(case)).collect()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取过滤配置: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("无法解析过滤配置: {}", path.display()))
    }
}
