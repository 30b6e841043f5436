//! 运行日志 - 业务能力层
//!
//! 只负责向日志文件追加 `[时间戳] 类型: 消息` 行

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// 运行日志写入器
///
/// 职责：
/// - 记录运行开始 / 结束
/// - 记录单个工作单元的失败
/// - 不关心流程顺序
#[derive(Debug, Clone)]
pub struct RunLog {
    log_file_path: String,
}

impl RunLog {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    /// 追加一行
    pub async fn write(&self, log_type: &str, message: &str) -> Result<()> {
        let line = format_line(log_type, message);
        debug!("写入运行日志: {}", line.trim_end());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// 追加一行，失败时只打警告（用于错误路径，不能再产生新的错误）
    pub async fn record(&self, log_type: &str, message: &str) {
        if let Err(e) = self.write(log_type, message).await {
            warn!("写入运行日志失败 ({}): {}", self.log_file_path, e);
        }
    }
}

fn format_line(log_type: &str, message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("[{}] {}: {}\n", timestamp, log_type, message)
}
