//! 会话工作者 - 编排层
//!
//! ## 职责
//!
//! 顺序处理一个分片里的全部工作单元。每个单元：
//!
//! 1. 打开新页面，屏蔽图片和样式表
//! 2. 在导航之前挂上响应拦截器（独立任务消费交换流）
//! 3. 交给 `SearchFlow` 走完 UI 流程
//! 4. 关闭页面，在限定时间内等拦截器把迟到的响应处理完
//!
//! 单个单元的任何失败都只记录到运行日志，然后继续下一个单元。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::classify;
use crate::infrastructure::{PageSource, SessionPage};
use crate::models::WorkItem;
use crate::services::{Aggregator, Progress, ResponseInterceptor, RunLog};
use crate::workflow::{FlowOutcome, ItemCtx, SearchFlow};

/// 单个分片的处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShardStats {
    /// 有结果的单元
    pub with_data: usize,
    /// 无结果 / 维护中的单元
    pub terminal: usize,
    /// 出错的单元
    pub failed: usize,
    /// 拦截器写入的记录数
    pub records: usize,
}

impl ShardStats {
    pub fn total(&self) -> usize {
        self.with_data + self.terminal + self.failed
    }

    pub fn merge(&mut self, other: &ShardStats) {
        self.with_data += other.with_data;
        self.terminal += other.terminal;
        self.failed += other.failed;
        self.records += other.records;
    }
}

/// 一个单元处理完的结果
struct ItemOutcome {
    flow: FlowOutcome,
    captured: usize,
}

/// 会话工作者
///
/// 同一时刻最多只持有一个页面
#[derive(Clone)]
pub struct SessionWorker {
    shard_index: usize,
    pages: Arc<dyn PageSource>,
    flow: SearchFlow,
    aggregator: Aggregator,
    progress: Option<Arc<Progress>>,
    run_log: RunLog,
    search_endpoint: String,
    details_endpoint: String,
    capture_drain: Duration,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shard_index: usize,
        pages: Arc<dyn PageSource>,
        flow: SearchFlow,
        aggregator: Aggregator,
        progress: Option<Arc<Progress>>,
        run_log: RunLog,
        endpoints: (&str, &str),
        capture_drain: Duration,
    ) -> Self {
        Self {
            shard_index,
            pages,
            flow,
            aggregator,
            progress,
            run_log,
            search_endpoint: endpoints.0.to_string(),
            details_endpoint: endpoints.1.to_string(),
            capture_drain,
        }
    }

    pub fn shard_index(&self) -> usize {
        self.shard_index
    }

    /// 按顺序处理整个分片
    pub async fn run(&self, shard: Vec<WorkItem>) -> ShardStats {
        let shard_len = shard.len();
        let mut stats = ShardStats::default();
        info!("[分片 {}] 🚦 开始处理 {} 个单元", self.shard_index, shard_len);

        for (index, item) in shard.iter().enumerate() {
            let ctx = ItemCtx::new(self.shard_index, index + 1, shard_len);
            debug!("{} ▶ {}", ctx, item);

            match self.process_item(item, &ctx).await {
                Ok(outcome) => {
                    stats.records += outcome.captured;
                    match outcome.flow {
                        FlowOutcome::Terminal(_) => stats.terminal += 1,
                        FlowOutcome::Results(report) => {
                            stats.with_data += 1;
                            info!(
                                "{} ✓ {} 完成，捕获 {} 条 (Load More {} 次)",
                                ctx, item, outcome.captured, report.continuations
                            );
                        }
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("{} ❌ {} 处理失败: {:#}", ctx, item, e);
                    self.run_log
                        .record(
                            "ERROR",
                            &format!("{} {} | {}: {:#}", ctx, item, classify(&e), e),
                        )
                        .await;
                }
            }

            if let Some(progress) = &self.progress {
                progress.item_finished();
            }
        }

        stats
    }

    /// 处理单个单元；无论流程是否成功，页面都会被关闭
    async fn process_item(&self, item: &WorkItem, ctx: &ItemCtx) -> Result<ItemOutcome> {
        let page = self.pages.open_page().await?;

        let capture = match self.attach_interceptor(page.as_ref(), item).await {
            Ok(capture) => capture,
            Err(e) => {
                close_page(page.as_ref(), ctx).await;
                return Err(e);
            }
        };

        let flow = self.flow.run(page.as_ref(), item, ctx).await;
        close_page(page.as_ref(), ctx).await;
        let captured = self.drain_capture(capture, ctx).await;

        Ok(ItemOutcome {
            flow: flow?,
            captured,
        })
    }

    /// 屏蔽子资源并启动拦截任务（必须在导航之前）
    async fn attach_interceptor(
        &self,
        page: &dyn SessionPage,
        item: &WorkItem,
    ) -> Result<JoinHandle<usize>> {
        page.block_subresources().await?;

        let interceptor = ResponseInterceptor::for_item(
            item,
            &self.search_endpoint,
            &self.details_endpoint,
            self.aggregator.clone(),
        )
        .with_progress(self.progress.clone());

        let exchanges = page
            .exchanges(&[interceptor.endpoint().to_string()])
            .await?;
        Ok(tokio::spawn(interceptor.run(exchanges)))
    }

    /// 页面关闭后等待拦截任务结束，超时则放弃剩余的交换
    async fn drain_capture(&self, mut capture: JoinHandle<usize>, ctx: &ItemCtx) -> usize {
        match timeout(self.capture_drain, &mut capture).await {
            Ok(Ok(captured)) => captured,
            Ok(Err(e)) => {
                warn!("{} 拦截任务异常结束: {}", ctx, e);
                0
            }
            Err(_) => {
                debug!("{} 拦截任务未在 {:?} 内结束，放弃", ctx, self.capture_drain);
                capture.abort();
                0
            }
        }
    }
}

async fn close_page(page: &dyn SessionPage, ctx: &ItemCtx) {
    if let Err(e) = page.close().await {
        warn!("{} 关闭页面失败: {}", ctx, e);
    }
}
