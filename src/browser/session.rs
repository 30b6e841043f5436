//! 阶段会话：每个抓取阶段打开一次浏览器，阶段结束（所有分片完成）后关闭

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;

use crate::browser::{open_browser, shutdown, BrowserHandle};
use crate::config::Config;
use crate::infrastructure::{ChromePages, PageSource};

/// 一个阶段内可用的页面来源
#[async_trait]
pub trait PhaseSession: Send {
    fn pages(&self) -> Arc<dyn PageSource>;

    /// 调用前应释放 `pages()` 返回的所有引用
    async fn close(self: Box<Self>);
}

/// 阶段会话的启动器
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, config: &Config) -> Result<Box<dyn PhaseSession>>;
}

/// 启动或连接 Chrome
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self, config: &Config) -> Result<Box<dyn PhaseSession>> {
        let BrowserHandle {
            browser,
            handler_task,
            owned,
        } = open_browser(config).await?;
        let browser = Arc::new(browser);
        let pages: Arc<dyn PageSource> = Arc::new(ChromePages::new(browser.clone()));

        Ok(Box::new(ChromeSession {
            browser,
            handler_task,
            owned,
            pages,
        }))
    }
}

struct ChromeSession {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    owned: bool,
    pages: Arc<dyn PageSource>,
}

#[async_trait]
impl PhaseSession for ChromeSession {
    fn pages(&self) -> Arc<dyn PageSource> {
        self.pages.clone()
    }

    async fn close(self: Box<Self>) {
        let ChromeSession {
            browser,
            handler_task,
            owned,
            pages,
        } = *self;
        // ChromePages 也持有一份 Arc<Browser>
        drop(pages);
        shutdown(browser, handler_task, owned).await;
    }
}
