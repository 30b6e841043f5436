//! 单个工作单元的 UI 交互流程 - 流程层
//!
//! 流程顺序（固定、线性）：
//! 1. 同意条款
//! 2. 选择法院层级
//! 3. 选择法院
//! 4. 输入日期 / 案件编号并搜索
//! 5. 处理声明弹窗，判断 无结果 / 维护中 / 有结果
//!
//! 每一步都是"等待元素出现 → 操作元素"，等待上限很长（分钟级）；
//! 步骤之间的短暂停顿只用于模拟人工节奏。

use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::{Config, Pacing};
use crate::error::StepError;
use crate::infrastructure::SessionPage;
use crate::models::{ScrapeMode, WorkItem};
use crate::workflow::item_ctx::ItemCtx;
use crate::workflow::pagination::{PaginationDriver, PaginationReport};
use crate::workflow::selectors::{self, *};

/// 搜索之后页面停在的终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// 没有搜索结果
    NoResults,
    /// 网站维护中
    Maintenance,
}

/// 一个工作单元的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// 没有数据可提取
    Terminal(TerminalState),
    /// 有结果；列表模式附带翻页情况
    Results(PaginationReport),
}

/// 根据 body 文字判断终止状态
pub fn classify_body(body: &str) -> Option<TerminalState> {
    if body.contains(NO_RESULTS_SIGNAL) {
        Some(TerminalState::NoResults)
    } else if body.contains(MAINTENANCE_SIGNAL) {
        Some(TerminalState::Maintenance)
    } else {
        None
    }
}

/// 单个工作单元的处理流程
///
/// - 不持有页面，由会话工作者传入
/// - 不提取数据，数据由拦截器在后台捕获
/// - 不关闭页面
#[derive(Debug, Clone)]
pub struct SearchFlow {
    landing_url: String,
    step_timeout: Duration,
    poll_interval: Duration,
    network_idle_timeout: Duration,
    listing_pacing: Pacing,
    detail_pacing: Pacing,
    max_load_more: Option<usize>,
}

impl SearchFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            landing_url: config.landing_url.clone(),
            step_timeout: config.step_timeout(),
            poll_interval: config.poll_interval(),
            network_idle_timeout: config.network_idle_timeout(),
            listing_pacing: config.listing_pacing.clone(),
            detail_pacing: config.detail_pacing.clone(),
            max_load_more: config.max_load_more,
        }
    }

    fn pacing(&self, mode: ScrapeMode) -> &Pacing {
        match mode {
            ScrapeMode::Listing => &self.listing_pacing,
            ScrapeMode::Detail => &self.detail_pacing,
        }
    }

    /// 导航到落地页并执行完整流程
    pub async fn run(
        &self,
        page: &dyn SessionPage,
        item: &WorkItem,
        ctx: &ItemCtx,
    ) -> Result<FlowOutcome> {
        let mode = item.mode();
        let pacing = self.pacing(mode);
        // 一个单元内打字速度保持不变
        let type_delay = pacing.random_type_delay();

        debug!("{} 打开落地页: {}", ctx, self.landing_url);
        page.goto_idle(&self.landing_url, self.network_idle_timeout).await?;

        // ========== 1. 同意条款 ==========
        self.wait_and_click(page, ACCEPT_TERMS).await?;
        pause(pacing.after_accept_ms).await;

        // ========== 2. 法院层级 ==========
        self.wait_and_click(page, SEARCH_BY_LABEL).await?;
        pause(pacing.step_pause_ms).await;
        self.wait_and_click(page, selectors::court_level(mode)).await?;
        pause(pacing.step_pause_ms).await;
        self.wait_and_click(page, APPLY_COURT_LEVEL).await?;
        pause(pacing.step_pause_ms).await;

        // ========== 3. 选择法院 ==========
        self.pick_court(page, item.court_name(), pacing, type_delay).await?;

        // ========== 4. 输入查询并搜索 ==========
        self.submit_query(page, item, pacing, type_delay).await?;

        // ========== 5. 结果判断 ==========
        let body = self.dismiss_acknowledgement(page, pacing, ctx).await?;
        if let Some(state) = classify_body(&body) {
            info!("{} 🈳 {:?}: {}", ctx, state, item);
            pause(pacing.terminal_linger_ms).await;
            return Ok(FlowOutcome::Terminal(state));
        }

        let report = match mode {
            ScrapeMode::Listing => {
                PaginationDriver::new(
                    Duration::from_millis(pacing.load_more_settle_ms),
                    self.max_load_more,
                )
                .drive(page, ctx)
                .await?
            }
            ScrapeMode::Detail => PaginationReport::default(),
        };
        pause(pacing.close_grace_ms).await;
        Ok(FlowOutcome::Results(report))
    }

    /// 打开法院选择器，输入法院名称，勾选全部匹配项并应用
    async fn pick_court(
        &self,
        page: &dyn SessionPage,
        court: &str,
        pacing: &Pacing,
        type_delay: Duration,
    ) -> Result<()> {
        self.wait_and_click(page, COURT_SELECT).await?;

        self.wait_for(page, SEARCH_COURTS).await?;
        page.focus(SEARCH_COURTS).await?;
        type_text(page, court, type_delay).await?;
        pause(pacing.after_court_typed_ms).await;
        page.press_enter().await?;

        let matches = page.count(COURT_MATCHES).await?;
        debug!("法院 {} 匹配到 {} 项", court, matches);
        for i in 0..matches {
            page.click(&selectors::court_option(i)).await?;
        }

        self.wait_and_click(page, APPLY_COURTS).await
    }

    /// 输入日期（列表）或案件编号（详情）并点击搜索
    async fn submit_query(
        &self,
        page: &dyn SessionPage,
        item: &WorkItem,
        pacing: &Pacing,
        type_delay: Duration,
    ) -> Result<()> {
        let mode = item.mode();
        let field = selectors::query_field(mode);

        self.wait_for(page, field).await?;
        page.focus(field).await?;
        pause(pacing.before_query_ms).await;
        type_text(page, item.query_value(), type_delay).await?;
        pause(pacing.after_query_typed_ms).await;
        if mode == ScrapeMode::Listing {
            page.press_enter().await?;
        }

        page.click(START_SEARCH).await?;
        pause(pacing.after_submit_ms).await;
        Ok(())
    }

    /// 搜索之后无条件检查声明弹窗；关闭后重新读取 body
    async fn dismiss_acknowledgement(
        &self,
        page: &dyn SessionPage,
        pacing: &Pacing,
        ctx: &ItemCtx,
    ) -> Result<String> {
        let body = page.body_text().await?;
        if !body.contains(ACKNOWLEDGE_SIGNAL) {
            return Ok(body);
        }

        debug!("{} 出现声明弹窗，点击确认", ctx);
        self.wait_and_click(page, ACKNOWLEDGE).await?;
        pause(pacing.after_ack_ms).await;
        page.body_text().await
    }

    async fn wait_and_click(&self, page: &dyn SessionPage, selector: &str) -> Result<()> {
        self.wait_for(page, selector).await?;
        page.click(selector).await
    }

    /// 轮询直到元素出现，超过上限返回 StepError::Timeout
    async fn wait_for(&self, page: &dyn SessionPage, selector: &str) -> Result<()> {
        let started = Instant::now();
        loop {
            if page.exists(selector).await? {
                return Ok(());
            }
            if started.elapsed() >= self.step_timeout {
                return Err(StepError::timeout(selector, self.step_timeout).into());
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// 逐字输入，每个字符之后等待 `delay`
async fn type_text(page: &dyn SessionPage, text: &str, delay: Duration) -> Result<()> {
    for ch in text.chars() {
        page.type_char(ch).await?;
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
    Ok(())
}

async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}
