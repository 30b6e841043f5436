//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 串起一次完整的运行：
//!
//! 1. **查询日期**：配置或交互输入，解析失败时重新询问
//! 2. **列表抓取**：遍历法院选择器列表，每个法院一个工作单元
//! 3. **补全与保存**：补全法院名称，保存 `<日期>.json`，打印法条统计
//! 4. **详情抓取**（可选）：按法条过滤后逐个案件抓取，保存 `<日期>_details.json`
//! 5. **运行日志**：记录 RUN / FINISHED 以及各单元的失败
//!
//! 每个阶段通过 `SessionLauncher` 启动一次浏览器，阶段结束（所有分片完成）后关闭。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::browser::{ChromeLauncher, SessionLauncher};
use crate::config::{split_list, Config};
use crate::models::{
    load_court_lookup, load_court_picker, CaptureRecord, CaseSummary, CourtLookup, CourtPick,
    DetailRecord, ScrapeMode, WorkItem,
};
use crate::orchestrator::pipeline::Pipeline;
use crate::services::{
    add_court_names, print_code_summary, save_json, CodeFilter, Progress, ProgressReporter,
    RunLog,
};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::utils::{is_yes, prompt_line, LookupDate};

const DATE_PROMPT: &str = "Enter the Lookup Date: ";
const DETAILS_PROMPT: &str =
    "Do you wish to continue with getting case data on specific codes? (yes/no) ";
const CODES_PROMPT: &str = "Enter the code sections, separated by commas: ";

/// 应用主结构
pub struct App {
    config: Config,
    courts: Vec<CourtPick>,
    lookup: CourtLookup,
    run_log: RunLog,
    launcher: Arc<dyn SessionLauncher>,
}

impl App {
    /// 初始化应用：加载静态列表（失败即终止）
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let courts = load_court_picker(&config.static_dir).await?;
        let lookup = load_court_lookup(&config.static_dir).await?;
        info!(
            "✓ 已加载 {} 个法院，查找表 {} 项",
            courts.len(),
            lookup.len()
        );

        let run_log = RunLog::new(config.run_log_file.clone());

        Ok(Self {
            config,
            courts,
            lookup,
            run_log,
            launcher: Arc::new(ChromeLauncher),
        })
    }

    /// 替换浏览器启动方式
    pub fn with_launcher(mut self, launcher: Arc<dyn SessionLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let date = self.lookup_date().await?;
        let query_date = date.query_value();
        self.run_log.record("RUN", &query_date).await;

        // ========== 列表 ==========
        let items: Vec<WorkItem> = self
            .courts
            .iter()
            .map(|pick| WorkItem::court(pick.court.clone(), query_date.clone()))
            .collect();
        let cases: Vec<CaseSummary> = self
            .scrape(ScrapeMode::Listing, items)
            .await?
            .into_iter()
            .filter_map(CaptureRecord::into_listing)
            .collect();
        let cases = add_court_names(cases, &self.lookup);

        save_json(self.data_path(&date.file_stem(), ""), &cases).await?;
        print_code_summary(&cases)?;

        // ========== 详情 ==========
        let mut details_count = None;
        if self.wants_details().await? {
            let filter = self.code_filter().await?;
            let selected = filter.apply(cases.clone());
            info!("🔎 按法条过滤后剩余 {} 个案件", selected.len());

            let items = self.detail_items(selected).await;
            let details: Vec<DetailRecord> = self
                .scrape(ScrapeMode::Detail, items)
                .await?
                .into_iter()
                .filter_map(CaptureRecord::into_detail)
                .collect();

            save_json(self.data_path(&date.file_stem(), "_details"), &details).await?;
            details_count = Some(details.len());
        }

        self.run_log.record("FINISHED", &query_date).await;
        print_final_stats(cases.len(), details_count, self.run_log.path());
        Ok(())
    }

    /// 一个阶段：启动浏览器 → 管线 → 关闭浏览器
    async fn scrape(&self, mode: ScrapeMode, items: Vec<WorkItem>) -> Result<Vec<CaptureRecord>> {
        if items.is_empty() {
            warn!("⚠️ 没有需要{}抓取的单元", mode);
            return Ok(Vec::new());
        }

        let session = self.launcher.launch(&self.config).await?;

        let progress = self
            .config
            .show_progress
            .then(|| Arc::new(Progress::new(mode, items.len())));
        let reporter = progress
            .clone()
            .map(|p| ProgressReporter::start(p, self.config.progress_refresh()));

        let pipeline = Pipeline::new(session.pages(), &self.config, self.run_log.clone());
        let report = pipeline.run(mode, items, progress).await;
        drop(pipeline);

        if let Some(reporter) = reporter {
            reporter.stop().await;
        }
        session.close().await;

        Ok(report.records)
    }

    /// 详情单元需要法院名称；查找表里没有的案件记为失败并跳过
    async fn detail_items(&self, cases: Vec<CaseSummary>) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(cases.len());
        for case in cases {
            match self.lookup.require(&case.qualified_fips) {
                Ok(court) => items.push(WorkItem::case(court, case)),
                Err(e) => {
                    error!("❌ {}: {}", case.formatted_case_number, e);
                    self.run_log
                        .record(
                            "ERROR",
                            &format!("{} {}: {}", case.name, case.formatted_case_number, e),
                        )
                        .await;
                }
            }
        }
        items
    }

    /// 配置中的日期必须合法；交互输入时反复询问直到合法
    async fn lookup_date(&self) -> Result<LookupDate> {
        if let Some(raw) = &self.config.lookup_date {
            return LookupDate::parse(raw).context("配置中的 lookup_date 无效");
        }
        loop {
            let input = prompt_line(DATE_PROMPT).await?;
            match LookupDate::parse(&input) {
                Ok(date) => return Ok(date),
                Err(e) => println!("{}", e),
            }
        }
    }

    async fn wants_details(&self) -> Result<bool> {
        match self.config.fetch_details {
            Some(answer) => Ok(answer),
            None => Ok(is_yes(&prompt_line(DETAILS_PROMPT).await?)),
        }
    }

    /// 读取过滤条件；非空时写入过滤配置文件
    ///
    /// 过滤以配置文件为准：本次没有输入时沿用上次保存的文件，文件不存在则不过滤
    async fn code_filter(&self) -> Result<CodeFilter> {
        let codes = match &self.config.code_filters {
            Some(codes) => codes.clone(),
            None => split_list(&prompt_line(CODES_PROMPT).await?),
        };
        let entered = CodeFilter::new(codes);
        if !entered.is_empty() {
            save_json(&self.config.filter_file, &entered).await?;
        }

        let filter = if Path::new(&self.config.filter_file).exists() {
            CodeFilter::load(&self.config.filter_file).await?
        } else {
            CodeFilter::default()
        };
        self.run_log
            .record("Search Query Codes", &filter.code_sections.join(","))
            .await;
        Ok(filter)
    }

    fn data_path(&self, stem: &str, suffix: &str) -> PathBuf {
        PathBuf::from(&self.config.data_dir).join(format!("{}{}.json", stem, suffix))
    }
}
