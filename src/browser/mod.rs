pub mod connection;
pub mod headless;
pub mod session;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;
pub use session::{ChromeLauncher, PhaseSession, SessionLauncher};

use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;

/// 浏览器句柄：浏览器本身 + 后台事件处理任务
pub struct BrowserHandle {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    /// 是否由本程序启动（连接到已有浏览器时不负责关闭它）
    pub owned: bool,
}

/// 根据配置连接已有浏览器或启动新的无头浏览器
pub async fn open_browser(config: &Config) -> Result<BrowserHandle> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await,
        None => launch_headless_browser(config).await,
    }
}

/// 关闭浏览器并停止事件处理任务
///
/// 调用前必须释放其它所有 `Arc<Browser>` 引用；连接到的外部浏览器不关闭
pub async fn shutdown(browser: Arc<Browser>, handler_task: JoinHandle<()>, owned: bool) {
    match Arc::try_unwrap(browser) {
        Ok(mut browser) if owned => {
            if let Err(e) = browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
            info!("🛑 浏览器已关闭");
        }
        Ok(_) => debug!("断开与外部浏览器的连接"),
        Err(_) => warn!("浏览器仍被引用，跳过关闭"),
    }
    handler_task.abort();
}
