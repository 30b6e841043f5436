/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ScrapeMode;
use crate::orchestrator::ShardStats;

/// 初始化 tracing 输出
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ocis_scraper={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 法院案件抓取");
    info!(
        "📊 分片数: 列表 {} / 详情 {}",
        config.listing_shards, config.detail_shards
    );
    match config.browser_debug_port {
        Some(port) => info!("🔌 连接已有浏览器: 端口 {}", port),
        None => info!("🖥️ 启动浏览器 (headless = {})", config.headless),
    }
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始信息
///
/// # 参数
/// - `mode`: 抓取模式
/// - `items`: 工作单元总数
/// - `shards`: 分片数
pub fn log_phase_start(mode: ScrapeMode, items: usize, shards: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始{}抓取", mode);
    info!("📄 工作单元: {} 个 / 分片: {} 个", items, shards);
    info!("{}", "=".repeat(60));
}

/// 记录分片完成信息
pub fn log_shard_complete(shard_index: usize, stats: &ShardStats) {
    info!(
        "[分片 {}] ✓ 完成: 有结果 {} / 无结果 {} / 失败 {} (共 {})",
        shard_index,
        stats.with_data,
        stats.terminal,
        stats.failed,
        stats.total()
    );
}

/// 打印阶段统计信息
pub fn log_phase_stats(mode: ScrapeMode, stats: &ShardStats, records: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📊 {}抓取完成", mode);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 有结果: {}/{}", stats.with_data, stats.total());
    info!("🈳 无结果: {}", stats.terminal);
    info!("❌ 失败: {}", stats.failed);
    info!("📥 记录数: {}", records);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `cases`: 列表阶段的案件数
/// - `details`: 详情阶段的记录数（未执行时为 None）
/// - `log_file_path`: 运行日志路径
pub fn print_final_stats(cases: usize, details: Option<usize>, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成");
    info!("{}", "=".repeat(60));
    info!("📋 案件列表: {} 条", cases);
    match details {
        Some(details) => info!("📑 案件详情: {} 条", details),
        None => info!("📑 未抓取案件详情"),
    }
    info!("{}", "=".repeat(60));
    info!("\n运行日志: {}", log_file_path);
}
