//! # OCIS Scraper
//!
//! 通过无头浏览器抓取弗吉尼亚州法院案件信息系统（OCIS）的案件列表和案件详情
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（页面），只暴露能力
//! - `SessionPage` / `PageSource` - 页面能力接口，测试中可替换
//! - `CdpPage` - 基于 CDP 的实现，`JsExecutor` 负责 JS 执行
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ResponseInterceptor` - 从网络交换中提取案件数据
//! - `Aggregator` - 跨分片汇总结果
//! - `Progress` / `RunLog` - 进度显示和运行日志
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个工作单元"的完整 UI 流程
//! - `SearchFlow` - 条款 → 法院层级 → 法院 → 查询 → 结果判断
//! - `PaginationDriver` - 列表模式的 Load More 循环
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 分片并发
//! - `orchestrator/session_worker` - 顺序处理单个分片
//! - `orchestrator/app` - 两个阶段的完整运行
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{open_browser, ChromeLauncher, SessionLauncher};
pub use config::{Config, Pacing};
pub use error::{BrowserError, CatalogError, ConfigError, StepError};
pub use infrastructure::{NetworkExchange, PageSource, SessionPage};
pub use models::{CaptureRecord, CaseSummary, ScrapeMode, WorkItem};
pub use orchestrator::{partition, App, Pipeline, PipelineReport};
pub use services::Aggregator;
pub use workflow::{FlowOutcome, SearchFlow, TerminalState};
