//! 页面能力接口 - 基础设施层
//!
//! 流程层只通过这里的 trait 操作页面，不直接接触 CDP。
//! 真实实现见 `cdp_page`，测试中用脚本化的内存页面替代。

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// 页面上一次完成的网络交换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkExchange {
    /// 请求的完整 URL
    pub url: String,
    /// 响应体；只有命中关注列表的请求才会读取
    pub body: Option<String>,
}

impl NetworkExchange {
    pub fn new(url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }
}

/// 页面生命周期内所有已完成网络交换组成的流，页面关闭后结束
pub type ExchangeStream = BoxStream<'static, NetworkExchange>;

/// 单个浏览器页面
///
/// 职责：
/// - 只暴露最基本的页面操作
/// - 不认识法院 / 案件
/// - 不处理流程顺序
#[async_trait]
pub trait SessionPage: Send + Sync {
    /// 屏蔽图片和样式表
    async fn block_subresources(&self) -> Result<()>;

    /// 订阅网络交换；`capture_bodies` 中的 URL 会读取响应体
    async fn exchanges(&self, capture_bodies: &[String]) -> Result<ExchangeStream>;

    /// 导航并等待 network-idle
    async fn goto_idle(&self, url: &str, idle_timeout: Duration) -> Result<()>;

    /// 选择器当前是否存在
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// 点击元素（DOM click）
    async fn click(&self, selector: &str) -> Result<()>;

    /// 聚焦元素
    async fn focus(&self, selector: &str) -> Result<()>;

    /// 向当前焦点输入一个字符
    async fn type_char(&self, ch: char) -> Result<()>;

    /// 按下回车
    async fn press_enter(&self) -> Result<()>;

    /// 匹配选择器的元素数量
    async fn count(&self, selector: &str) -> Result<usize>;

    /// body 的 textContent
    async fn body_text(&self) -> Result<String>;

    /// 关闭页面，之后交换流结束
    async fn close(&self) -> Result<()>;
}

/// 页面工厂，每个会话工作者从这里取页面
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn SessionPage>>;
}
