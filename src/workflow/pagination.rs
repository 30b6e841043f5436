//! 翻页驱动（仅列表模式）
//!
//! 反复点击 "Load More Results" 直到页面不再提供；会话即将过期时先点延长。

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::infrastructure::SessionPage;
use crate::workflow::item_ctx::ItemCtx;
use crate::workflow::selectors::{
    EXTEND_SESSION, EXTEND_SESSION_SIGNAL, LOAD_MORE, LOAD_MORE_SIGNAL,
};

/// 翻页结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationReport {
    /// 点击 "Load More" 的次数
    pub continuations: usize,
    /// 延长会话的次数
    pub session_extensions: usize,
    /// 是否因为达到上限而停止
    pub capped: bool,
}

/// 翻页驱动
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    settle: Duration,
    max_continuations: Option<usize>,
}

impl PaginationDriver {
    pub fn new(settle: Duration, max_continuations: Option<usize>) -> Self {
        Self {
            settle,
            max_continuations,
        }
    }

    /// 一直翻到页面不再提供 "Load More"
    ///
    /// 不设上限时是否终止完全取决于页面
    pub async fn drive(&self, page: &dyn SessionPage, ctx: &ItemCtx) -> Result<PaginationReport> {
        let mut report = PaginationReport::default();

        loop {
            let body = page.body_text().await?;

            if body.contains(EXTEND_SESSION_SIGNAL) {
                debug!("{} 会话即将过期，点击延长", ctx);
                page.click(EXTEND_SESSION).await?;
                report.session_extensions += 1;
            }

            if !body.contains(LOAD_MORE_SIGNAL) {
                break;
            }

            if let Some(max) = self.max_continuations {
                if report.continuations >= max {
                    warn!(
                        "{} ⚠️ 已达到 Load More 上限 {}，停止翻页",
                        ctx, max
                    );
                    report.capped = true;
                    break;
                }
            }

            page.click(LOAD_MORE).await?;
            report.continuations += 1;
            debug!("{} 第 {} 次 Load More", ctx, report.continuations);
            sleep(self.settle).await;
        }

        Ok(report)
    }
}
