//! 进度显示 - 业务能力层
//!
//! 纯观察者：计数器只在这里读，流程正确性不依赖它

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::models::ScrapeMode;

/// 进度计数器（弱一致）
#[derive(Debug)]
pub struct Progress {
    mode: ScrapeMode,
    cases_found: AtomicUsize,
    items_total: AtomicUsize,
    items_finished: AtomicUsize,
    status: Mutex<String>,
}

impl Progress {
    pub fn new(mode: ScrapeMode, items_total: usize) -> Self {
        Self {
            mode,
            cases_found: AtomicUsize::new(0),
            items_total: AtomicUsize::new(items_total),
            items_finished: AtomicUsize::new(0),
            status: Mutex::new(String::new()),
        }
    }

    /// 拦截器找到了 `count` 条记录
    pub fn record_found(&self, count: usize, court: &str) {
        self.cases_found.fetch_add(count, Ordering::Relaxed);
        self.set_status(format!("Found {} in {}", count, court));
    }

    /// 一个工作单元处理结束（无论成功与否）
    pub fn item_finished(&self) {
        self.items_finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_status(&self, status: impl Into<String>) {
        if let Ok(mut guard) = self.status.lock() {
            *guard = status.into();
        }
    }

    pub fn cases_found(&self) -> usize {
        self.cases_found.load(Ordering::Relaxed)
    }

    pub fn items_left(&self) -> usize {
        self.items_total
            .load(Ordering::Relaxed)
            .saturating_sub(self.items_finished.load(Ordering::Relaxed))
    }

    /// 渲染一行状态，`flip` 控制指示符方向
    pub fn render(&self, flip: bool) -> String {
        let (a, b) = if flip { ('/', '\\') } else { ('\\', '/') };
        let status = self
            .status
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        match self.mode {
            ScrapeMode::Listing => format!(
                "<<<<<<<< {} {} Total Cases: {} Courts Left {} {} >>>>>>>",
                a,
                status,
                self.cases_found(),
                self.items_left(),
                b
            ),
            ScrapeMode::Detail => format!(
                "<<<<<<<< {} {} Captured: {} Cases Left {} {} >>>>>>>",
                a,
                status,
                self.cases_found(),
                self.items_left(),
                b
            ),
        }
    }
}

/// 后台刷新进度行
pub struct ProgressReporter {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// 启动后台任务，每 `refresh` 重写一次同一行
    pub fn start(progress: Arc<Progress>, refresh: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(refresh.max(Duration::from_millis(10)));
            let mut flip = true;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let mut out = std::io::stdout().lock();
                        let _ = write!(out, "\r{}", progress.render(flip));
                        let _ = out.flush();
                        flip = !flip;
                    }
                }
            }
        });
        Self { stop_tx, handle }
    }

    /// 停止刷新并换行
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.await;
        println!();
    }
}
