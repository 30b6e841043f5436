use std::fmt::Display;

use crate::models::case::CaseSummary;

/// 抓取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeMode {
    /// 某个日期、某个法院的案件列表
    Listing,
    /// 单个案件的完整记录
    Detail,
}

impl ScrapeMode {
    pub fn name(self) -> &'static str {
        match self {
            ScrapeMode::Listing => "列表",
            ScrapeMode::Detail => "详情",
        }
    }
}

impl Display for ScrapeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一个工作单元，创建后不再修改
#[derive(Debug, Clone, PartialEq)]
pub enum WorkItem {
    /// 列表模式：法院 + 日期（MM/DD/YYYY）
    Court { court: String, hearing_date: String },
    /// 详情模式：法院选择器名称 + 列表阶段得到的案件摘要
    Case { court: String, summary: CaseSummary },
}

impl WorkItem {
    pub fn court(court: impl Into<String>, hearing_date: impl Into<String>) -> Self {
        WorkItem::Court {
            court: court.into(),
            hearing_date: hearing_date.into(),
        }
    }

    pub fn case(court: impl Into<String>, summary: CaseSummary) -> Self {
        WorkItem::Case {
            court: court.into(),
            summary,
        }
    }

    pub fn mode(&self) -> ScrapeMode {
        match self {
            WorkItem::Court { .. } => ScrapeMode::Listing,
            WorkItem::Case { .. } => ScrapeMode::Detail,
        }
    }

    /// 在法院选择器中输入的名称
    pub fn court_name(&self) -> &str {
        match self {
            WorkItem::Court { court, .. } | WorkItem::Case { court, .. } => court,
        }
    }

    /// 查询输入框中的值：日期或案件编号
    pub fn query_value(&self) -> &str {
        match self {
            WorkItem::Court { hearing_date, .. } => hearing_date,
            WorkItem::Case { summary, .. } => &summary.formatted_case_number,
        }
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkItem::Court {
                court,
                hearing_date,
            } => write!(f, "{} @ {}", court, hearing_date),
            WorkItem::Case { court, summary } => write!(
                f,
                "{}, {}, {}",
                summary.name, court, summary.formatted_case_number
            ),
        }
    }
}
