//! JS 执行器 - 基础设施层
//!
//! 持有一个 page，页面上的 DOM 查询全部通过这里的 JS 完成

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// network-idle 检测结果
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleReport {
    /// 是否在超时之前达到空闲
    pub ok: bool,
    pub waited_ms: u64,
}

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 暴露 eval() 和基于选择器的 DOM 查询
/// - 不认识法院 / 案件
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于 CDP 命令）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        Ok(serde_json::from_value(json_value)?)
    }

    pub async fn query_exists(&self, selector: &str) -> Result<bool> {
        let js_code = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        self.eval_as(js_code).await
    }

    pub async fn query_count(&self, selector: &str) -> Result<usize> {
        let js_code = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(selector)?
        );
        self.eval_as(js_code).await
    }

    /// 对第一个匹配的元素执行一段语句（`el` 为元素），元素不存在时返回 false
    pub async fn with_element(&self, selector: &str, action: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                {};
                return true;
            }})()
            "#,
            serde_json::to_string(selector)?,
            action
        );
        self.eval_as(js_code).await
    }

    /// body 的 textContent，body 尚未创建时为空串
    pub async fn body_text(&self) -> Result<String> {
        self.eval_as("document.body ? document.body.textContent : ''").await
    }

    /// 在页面内轮询 performance 资源计数，连续 500ms 不变且 readyState 为 complete 视为空闲
    pub async fn wait_for_network_idle(&self, timeout: Duration) -> Result<IdleReport> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let js_code = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = 500;
                const interval = 100;
                const start = Date.now();
                const resources = (fallback) => {{
                    try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return fallback; }}
                }};
                let lastCount = resources(0);
                let stableMs = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const curCount = resources(lastCount);
                    if (document.readyState === 'complete' && curCount === lastCount) {{
                        stableMs += interval;
                        if (stableMs >= idleMs) return {{ ok: true, waitedMs: Date.now() - start }};
                    }} else {{
                        stableMs = 0;
                    }}
                    lastCount = curCount;
                }}
                return {{ ok: false, waitedMs: Date.now() - start }};
            }})()"#,
            timeout_ms = timeout_ms
        );
        self.eval_as(js_code).await
    }
}
