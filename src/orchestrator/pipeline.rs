//! 抓取管线 - 编排层
//!
//! 分片 → 每个分片一个会话工作者（tokio 任务）→ 全部结束后取出汇总结果。
//! 工作者之间不做负载均衡，也没有中途取消。

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::error;

use crate::config::Config;
use crate::infrastructure::PageSource;
use crate::models::{CaptureRecord, ScrapeMode, WorkItem};
use crate::orchestrator::session_worker::{SessionWorker, ShardStats};
use crate::orchestrator::shard::partition;
use crate::services::{Aggregator, Progress, RunLog};
use crate::utils::logging::{log_phase_start, log_phase_stats, log_shard_complete};
use crate::workflow::SearchFlow;

/// 一次抓取的结果
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// 汇总的全部记录（跨分片无顺序保证）
    pub records: Vec<CaptureRecord>,
    /// 所有分片的统计之和
    pub stats: ShardStats,
    /// 实际产生的分片数
    pub shards: usize,
}

/// 抓取管线
pub struct Pipeline {
    pages: Arc<dyn PageSource>,
    flow: SearchFlow,
    run_log: RunLog,
    listing_shards: usize,
    detail_shards: usize,
    search_endpoint: String,
    details_endpoint: String,
    capture_drain: Duration,
}

impl Pipeline {
    pub fn new(pages: Arc<dyn PageSource>, config: &Config, run_log: RunLog) -> Self {
        Self {
            pages,
            flow: SearchFlow::new(config),
            run_log,
            listing_shards: config.listing_shards,
            detail_shards: config.detail_shards,
            search_endpoint: config.search_endpoint.clone(),
            details_endpoint: config.details_endpoint.clone(),
            capture_drain: config.capture_drain(),
        }
    }

    pub fn shard_count(&self, mode: ScrapeMode) -> usize {
        match mode {
            ScrapeMode::Listing => self.listing_shards,
            ScrapeMode::Detail => self.detail_shards,
        }
    }

    /// 抓取全部工作单元
    ///
    /// 单元的模式决定分片数；单个单元失败不影响其它单元，也不会让本函数出错
    pub async fn run(
        &self,
        mode: ScrapeMode,
        items: Vec<WorkItem>,
        progress: Option<Arc<Progress>>,
    ) -> PipelineReport {
        let total_items = items.len();
        let aggregator = Aggregator::new();
        let shards = partition(items, self.shard_count(mode));
        let shard_total = shards.len();
        log_phase_start(mode, total_items, shard_total);

        let handles: Vec<_> = shards
            .into_iter()
            .enumerate()
            .map(|(idx, shard)| {
                let worker = SessionWorker::new(
                    idx + 1,
                    self.pages.clone(),
                    self.flow.clone(),
                    aggregator.clone(),
                    progress.clone(),
                    self.run_log.clone(),
                    (&self.search_endpoint, &self.details_endpoint),
                    self.capture_drain,
                );
                tokio::spawn(async move {
                    let stats = worker.run(shard).await;
                    (worker.shard_index(), stats)
                })
            })
            .collect();

        // 屏障：等所有分片结束
        let mut stats = ShardStats::default();
        for result in join_all(handles).await {
            match result {
                Ok((shard_index, shard_stats)) => {
                    log_shard_complete(shard_index, &shard_stats);
                    stats.merge(&shard_stats);
                }
                Err(e) => error!("分片任务执行失败: {}", e),
            }
        }

        let records = aggregator.drain();
        log_phase_stats(mode, &stats, records.len());

        PipelineReport {
            records,
            stats,
            shards: shard_total,
        }
    }
}
