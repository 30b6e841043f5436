//! OCIS 页面上的元素选择器和页面文字信号
//!
//! 这些是外部页面的结构，页面改版后需要同步修改

use crate::models::ScrapeMode;

// ========== 元素 ==========

pub const ACCEPT_TERMS: &str = "#acceptTerms";
pub const SEARCH_BY_LABEL: &str = "#searchByLabelValue";
/// 列表模式选择的法院层级
pub const COURT_LEVEL_LISTING: &str = "#courtLevelDivLabel2";
/// 详情模式选择的法院层级
pub const COURT_LEVEL_DETAIL: &str = "#courtLevelDivLabel1";
pub const APPLY_COURT_LEVEL: &str = "#applySelectCourtLevel";
pub const COURT_SELECT: &str = "#courtSelectMobileLabel";
pub const SEARCH_COURTS: &str = "#searchCourtsMobile";
/// 法院搜索后列出的匹配项
pub const COURT_MATCHES: &str =
    "#main > app-selection > div > div.container-fluid > div:nth-child(3) > span";
pub const APPLY_COURTS: &str = "#applyButton";
pub const DATE_FIELD: &str = "#datepickerele";
pub const CASE_NUMBER_FIELD: &str = "#caseNumberSearchFeildMobile";
pub const START_SEARCH: &str = "#startSearchMobile";
pub const ACKNOWLEDGE: &str = "#acknowledgeDisclaimers";
pub const EXTEND_SESSION: &str = "#extendBtn1";
pub const LOAD_MORE: &str = "#loadMore";

/// 第 i 个匹配法院的勾选项
pub fn court_option(index: usize) -> String {
    format!("#courtName{}", index)
}

pub fn court_level(mode: ScrapeMode) -> &'static str {
    match mode {
        ScrapeMode::Listing => COURT_LEVEL_LISTING,
        ScrapeMode::Detail => COURT_LEVEL_DETAIL,
    }
}

pub fn query_field(mode: ScrapeMode) -> &'static str {
    match mode {
        ScrapeMode::Listing => DATE_FIELD,
        ScrapeMode::Detail => CASE_NUMBER_FIELD,
    }
}

// ========== body 文字信号 ==========

pub const ACKNOWLEDGE_SIGNAL: &str = "Acknowledge";
pub const NO_RESULTS_SIGNAL: &str = "No Search Results found";
pub const MAINTENANCE_SIGNAL: &str = "undergoing maintenance or updates";
pub const EXTEND_SESSION_SIGNAL: &str = "Extend Session";
pub const LOAD_MORE_SIGNAL: &str = "Load More Results";
