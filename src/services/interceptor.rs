//! 响应拦截 - 业务能力层
//!
//! 被动观察一个页面上完成的每一次网络交换，命中接口签名时提取数据并写入汇总。
//! 与 UI 步骤互不等待，只通过汇总集合交流。

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::infrastructure::{ExchangeStream, NetworkExchange};
use crate::models::{CaptureRecord, CaseSummary, DetailRecord, WorkItem};
use crate::services::aggregator::Aggregator;
use crate::services::progress::Progress;

/// 当前页面要提取什么
#[derive(Debug, Clone)]
pub enum CaptureTarget {
    /// 列表接口：每一行打上所查法院的标记
    Listing { court: String },
    /// 详情接口：和列表阶段的摘要一起保存
    Detail { summary: CaseSummary },
}

/// 一个页面的响应拦截器
pub struct ResponseInterceptor {
    endpoint: String,
    target: CaptureTarget,
    aggregator: Aggregator,
    progress: Option<Arc<Progress>>,
}

impl ResponseInterceptor {
    pub fn new(endpoint: impl Into<String>, target: CaptureTarget, aggregator: Aggregator) -> Self {
        Self {
            endpoint: endpoint.into(),
            target,
            aggregator,
            progress: None,
        }
    }

    /// 按工作单元构造：列表单元监听搜索接口，案件单元监听详情接口
    pub fn for_item(
        item: &WorkItem,
        search_endpoint: &str,
        details_endpoint: &str,
        aggregator: Aggregator,
    ) -> Self {
        match item {
            WorkItem::Court { court, .. } => Self::new(
                search_endpoint,
                CaptureTarget::Listing {
                    court: court.clone(),
                },
                aggregator,
            ),
            WorkItem::Case { court, summary } => {
                let mut summary = summary.clone();
                summary.court_name = Some(court.replacen('/', "_", 1));
                Self::new(
                    details_endpoint,
                    CaptureTarget::Detail { summary },
                    aggregator,
                )
            }
        }
    }

    pub fn with_progress(mut self, progress: Option<Arc<Progress>>) -> Self {
        self.progress = progress;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 消费交换流直到页面关闭，返回写入的记录数
    pub async fn run(self, mut exchanges: ExchangeStream) -> usize {
        let mut captured = 0;
        while let Some(exchange) = exchanges.next().await {
            captured += self.observe(&exchange);
        }
        captured
    }

    /// 处理一次交换，返回写入的记录数
    ///
    /// 签名不匹配、响应体无法解析、payload 为 null 都是静默的空操作
    pub fn observe(&self, exchange: &NetworkExchange) -> usize {
        if exchange.url != self.endpoint {
            return 0;
        }
        let Some(body) = exchange.body.as_deref() else {
            debug!("命中 {} 但没有响应体", exchange.url);
            return 0;
        };
        let json: JsonValue = match serde_json::from_str(body) {
            Ok(json) => json,
            Err(e) => {
                debug!("响应体不是 JSON ({}): {}", exchange.url, e);
                return 0;
            }
        };
        let Some(payload) = extract_payload(&json) else {
            debug!("payload 为空: {}", exchange.url);
            return 0;
        };

        match &self.target {
            CaptureTarget::Listing { court } => self.capture_listing(payload, court),
            CaptureTarget::Detail { summary } => {
                self.aggregator.push(CaptureRecord::Detail(DetailRecord {
                    summary: summary.clone(),
                    details: payload.clone(),
                }));
                if let Some(progress) = &self.progress {
                    progress.record_found(1, summary.court_name.as_deref().unwrap_or_default());
                }
                1
            }
        }
    }

    /// 只有 noOfRecords 明确为 0 时跳过；缺失时照常读取 searchResults
    fn capture_listing(&self, payload: &JsonValue, court: &str) -> usize {
        let no_of_records = payload.get("noOfRecords").and_then(|v| v.as_u64());
        if let Some(progress) = &self.progress {
            progress.record_found(no_of_records.unwrap_or(0) as usize, court);
        }
        if no_of_records == Some(0) {
            return 0;
        }

        let Some(rows) = payload.get("searchResults").and_then(|v| v.as_array()) else {
            return 0;
        };
        let rows: Vec<CaptureRecord> = rows
            .iter()
            .filter_map(CaseSummary::from_row)
            .map(|mut summary| {
                summary.searched_court = Some(court.to_string());
                CaptureRecord::Listing(summary)
            })
            .collect();

        let count = rows.len();
        self.aggregator.extend(rows);
        count
    }
}

/// 取 `context.entity.payload`，null 视为不存在
fn extract_payload(json: &JsonValue) -> Option<&JsonValue> {
    json.pointer("/context/entity/payload")
        .filter(|payload| !payload.is_null())
}
