//! 基于 chromiumoxide 的页面实现 - 基础设施层

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams as FetchEnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, ErrorReason, EventLoadingFinished,
    EventResponseReceived, GetResponseBodyParams, RequestId, ResourceType,
};
use chromiumoxide::{Browser, Page};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{BrowserError, StepError};
use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::session_page::{
    ExchangeStream, NetworkExchange, PageSource, SessionPage,
};

/// 视口大小，OCIS 在窄屏下使用 *Mobile 系列元素
const VIEWPORT_WIDTH: i64 = 540;
const VIEWPORT_HEIGHT: i64 = 600;

/// CDP 页面
///
/// 页面上挂着的后台任务（资源屏蔽、网络交换转发）在 close() 时一并终止
pub struct CdpPage {
    executor: JsExecutor,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CdpPage {
    pub async fn new(page: Page) -> Result<Self> {
        let viewport = SetDeviceMetricsOverrideParams::builder()
            .width(VIEWPORT_WIDTH)
            .height(VIEWPORT_HEIGHT)
            .device_scale_factor(1.0)
            .mobile(true)
            .build()
            .map_err(|e| anyhow!("构建视口参数失败: {}", e))?;
        page.execute(viewport).await?;
        page.execute(NetworkEnableParams::default()).await?;

        Ok(Self {
            executor: JsExecutor::new(page),
            tasks: Mutex::new(Vec::new()),
        })
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(handle);
        }
    }

    async fn dispatch_key(&self, params: DispatchKeyEventParams) -> Result<()> {
        self.page().execute(params).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionPage for CdpPage {
    async fn block_subresources(&self) -> Result<()> {
        let patterns = vec![
            RequestPattern::builder()
                .resource_type(ResourceType::Image)
                .build(),
            RequestPattern::builder()
                .resource_type(ResourceType::Stylesheet)
                .build(),
        ];
        let mut paused = self.page().event_listener::<EventRequestPaused>().await?;
        self.page()
            .execute(FetchEnableParams::builder().patterns(patterns).build())
            .await?;

        // 只拦截了图片和样式表，所以这里一律拒绝
        let page = self.page().clone();
        self.track(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let fail =
                    FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
                if let Err(e) = page.execute(fail).await {
                    debug!("拒绝子资源请求失败: {}", e);
                }
            }
        }));
        Ok(())
    }

    async fn exchanges(&self, capture_bodies: &[String]) -> Result<ExchangeStream> {
        let responses = self
            .page()
            .event_listener::<EventResponseReceived>()
            .await?
            .map(|event| (event.request_id.clone(), event.response.url.clone()));
        let finished = self
            .page()
            .event_listener::<EventLoadingFinished>()
            .await?
            .map(|event| event.request_id.clone());
        let (tx, rx) = mpsc::unbounded::<NetworkExchange>();
        let watched_urls = capture_bodies.to_vec();
        let page = self.page().clone();

        self.track(tokio::spawn(forward_exchanges(
            responses,
            finished,
            watched_urls,
            tx,
            move |request_id| {
                let page = page.clone();
                async move { read_body(&page, request_id).await }
            },
        )));

        Ok(rx.boxed())
    }

    async fn goto_idle(&self, url: &str, idle_timeout: Duration) -> Result<()> {
        self.page()
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        match self.executor.wait_for_network_idle(idle_timeout).await {
            Ok(idle) if idle.ok => debug!("network-idle 已达到 (waitedMs={})", idle.waited_ms),
            Ok(idle) => warn!("等待 network-idle 超时 (waitedMs={})", idle.waited_ms),
            Err(e) => warn!("network-idle 检测失败: {}", e),
        }
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.executor.query_exists(selector).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        if self.executor.with_element(selector, "el.click()").await? {
            Ok(())
        } else {
            Err(StepError::missing(selector).into())
        }
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        if self.executor.with_element(selector, "el.focus()").await? {
            Ok(())
        } else {
            Err(StepError::missing(selector).into())
        }
    }

    async fn type_char(&self, ch: char) -> Result<()> {
        let params = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::Char)
            .text(ch.to_string())
            .build()
            .map_err(|e| anyhow!("构建按键参数失败: {}", e))?;
        self.dispatch_key(params).await
    }

    async fn press_enter(&self) -> Result<()> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Enter")
            .code("Enter")
            .text("\r")
            .windows_virtual_key_code(13)
            .build()
            .map_err(|e| anyhow!("构建按键参数失败: {}", e))?;
        self.dispatch_key(down).await?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .build()
            .map_err(|e| anyhow!("构建按键参数失败: {}", e))?;
        self.dispatch_key(up).await
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.executor.query_count(selector).await
    }

    async fn body_text(&self) -> Result<String> {
        self.executor.body_text().await
    }

    async fn close(&self) -> Result<()> {
        let result = self.page().clone().close().await;
        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            task.abort();
        }
        result?;
        Ok(())
    }
}

/// 把 responseReceived / loadingFinished 两路事件配对成完成的交换
///
/// 同一个请求的 responseReceived 一定先于 loadingFinished 入队，
/// 所以每轮都先取 `responses`，保证 finished 到来时 URL 已登记。
async fn forward_exchanges<K, R, F, B, Fut>(
    responses: R,
    finished: F,
    watched_urls: Vec<String>,
    tx: mpsc::UnboundedSender<NetworkExchange>,
    read_body: B,
) where
    K: Eq + Hash,
    R: Stream<Item = (K, String)>,
    F: Stream<Item = K>,
    B: Fn(K) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    futures::pin_mut!(responses, finished);
    let mut in_flight: HashMap<K, String> = HashMap::new();
    loop {
        tokio::select! {
            biased;
            Some((request_id, url)) = responses.next() => {
                in_flight.insert(request_id, url);
            }
            Some(request_id) = finished.next() => {
                let Some(url) = in_flight.remove(&request_id) else {
                    continue;
                };
                let body = if watched_urls.iter().any(|w| w == &url) {
                    read_body(request_id).await
                } else {
                    None
                };
                if tx.unbounded_send(NetworkExchange::new(url, body)).is_err() {
                    break;
                }
            }
            else => break,
        }
    }
}

/// 读取响应体；base64 编码（非文本）的响应直接忽略
async fn read_body(page: &Page, request_id: RequestId) -> Option<String> {
    match page.execute(GetResponseBodyParams::new(request_id)).await {
        Ok(resp) if !resp.result.base64_encoded => Some(resp.result.body.clone()),
        Ok(_) => {
            debug!("响应体为 base64 编码，忽略");
            None
        }
        Err(e) => {
            warn!("读取响应体失败: {}", e);
            None
        }
    }
}

/// 从同一个浏览器进程中打开页面
#[derive(Clone)]
pub struct ChromePages {
    browser: Arc<Browser>,
}

impl ChromePages {
    pub fn new(browser: Arc<Browser>) -> Self {
        Self { browser }
    }
}

#[async_trait]
impl PageSource for ChromePages {
    async fn open_page(&self) -> Result<Box<dyn SessionPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;
        Ok(Box::new(CdpPage::new(page).await?))
    }
}
