//! 法院名称补全 - 业务能力层

use tracing::debug;

use crate::models::{CaseSummary, CourtLookup};

/// 按 qualifiedFips 补全 courtName（大写）；查不到的行保持原样
pub fn add_court_names(cases: Vec<CaseSummary>, lookup: &CourtLookup) -> Vec<CaseSummary> {
    let mut missing = 0;
    let cases: Vec<CaseSummary> = cases
        .into_iter()
        .map(|mut case| {
            match lookup.court_name(&case.qualified_fips) {
                Some(name) => case.court_name = Some(name.to_uppercase()),
                None => missing += 1,
            }
            case
        })
        .collect();
    if missing > 0 {
        debug!("{} 条记录在查找表中没有对应法院", missing);
    }
    cases
}
