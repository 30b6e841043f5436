//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责分片、并发和阶段调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 查询日期、列表阶段、详情阶段、结果保存
//! - 每个阶段启动 / 关闭一次浏览器
//! - 管理进度显示
//!
//! ### `pipeline` - 抓取管线
//! - 分片（`shard::partition`）
//! - 每个分片一个 tokio 任务，全部结束后取出汇总结果
//!
//! ### `session_worker` - 会话工作者
//! - 顺序处理一个分片
//! - 每个单元一个新页面，先挂拦截器再导航
//! - 捕获单元级错误并写入运行日志
//!
//! ## 层次关系
//!
//! ```text
//! app (两个阶段)
//!     ↓
//! pipeline (Vec<Vec<WorkItem>>)
//!     ↓
//! session_worker (Vec<WorkItem>)
//!     ↓
//! workflow::SearchFlow (单个 WorkItem)
//!     ↓
//! services (拦截 / 汇总 / 进度 / 日志)
//!     ↓
//! infrastructure (SessionPage)
//! ```

pub mod app;
pub mod pipeline;
pub mod session_worker;
pub mod shard;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{Pipeline, PipelineReport};
pub use session_worker::{SessionWorker, ShardStats};
pub use shard::partition;
