use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

/// 搜索结果中的一行（一个案件的摘要）
///
/// 只声明流程用得到的字段，其余字段原样保存在 `extra` 中，序列化时展开回去。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub formatted_case_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub qualified_fips: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code_section: String,
    /// 法院名称（查找表补全，或详情模式下的搜索法院）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_name: Option<String>,
    /// 抓到这一行的法院选择器名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searched_court: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl CaseSummary {
    /// 从接口返回的一行 JSON 解析；不是对象时返回 None
    pub fn from_row(row: &JsonValue) -> Option<Self> {
        if !row.is_object() {
            return None;
        }
        match serde_json::from_value(row.clone()) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("无法解析搜索结果行: {}", e);
                None
            }
        }
    }
}

/// 接口里这几个字段偶尔是 null 或数字：null 记为空串，其余标量转成字符串
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}

/// 详情模式的一条结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub summary: CaseSummary,
    pub details: JsonValue,
}

/// 拦截器成功提取的一条结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureRecord {
    Detail(DetailRecord),
    Listing(CaseSummary),
}

impl CaptureRecord {
    pub fn summary(&self) -> &CaseSummary {
        match self {
            CaptureRecord::Listing(summary) => summary,
            CaptureRecord::Detail(record) => &record.summary,
        }
    }

    /// 抓取时所属的法院
    pub fn court(&self) -> Option<&str> {
        match self {
            CaptureRecord::Listing(summary) => summary.searched_court.as_deref(),
            CaptureRecord::Detail(record) => record.summary.court_name.as_deref(),
        }
    }

    pub fn into_listing(self) -> Option<CaseSummary> {
        match self {
            CaptureRecord::Listing(summary) => Some(summary),
            CaptureRecord::Detail(_) => None,
        }
    }

    pub fn into_detail(self) -> Option<DetailRecord> {
        match self {
            CaptureRecord::Detail(record) => Some(record),
            CaptureRecord::Listing(_) => None,
        }
    }
}
