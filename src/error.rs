use std::time::Duration;

use thiserror::Error;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {reason}")]
    ConnectionFailed { port: u16, reason: String },
    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
}

/// UI 交互步骤错误
#[derive(Debug, Error)]
pub enum StepError {
    /// 元素在等待上限内始终没有出现
    #[error("等待元素 {selector} 超时 ({waited:?})")]
    Timeout { selector: String, waited: Duration },
    /// 操作时元素已不存在
    #[error("元素不存在: {selector}")]
    ElementMissing { selector: String },
}

/// 静态列表 / 查找表错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 查找表中没有对应的法院
    #[error("查找表中没有 FIPS {fips} 对应的法院")]
    UnknownCourt { fips: String },
    /// 无法解析日期
    #[error("无法解析日期: {input}")]
    InvalidDate { input: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl StepError {
    pub fn timeout(selector: impl Into<String>, waited: Duration) -> Self {
        StepError::Timeout {
            selector: selector.into(),
            waited,
        }
    }

    pub fn missing(selector: impl Into<String>) -> Self {
        StepError::ElementMissing {
            selector: selector.into(),
        }
    }
}

/// 对单个案件的失败做分类，用于写入运行日志
///
/// 单元内的失败（`Step` / 部分 `Browser`）在会话工作者边界被捕获并记录；
/// 静态列表、配置以及浏览器启动失败不经过这里，直接终止本次运行。
pub fn classify(err: &anyhow::Error) -> &'static str {
    if let Some(step) = err.downcast_ref::<StepError>() {
        return match step {
            StepError::Timeout { .. } => "STEP_TIMEOUT",
            StepError::ElementMissing { .. } => "ELEMENT_MISSING",
        };
    }
    if err.downcast_ref::<BrowserError>().is_some() {
        return "BROWSER";
    }
    if err.downcast_ref::<CatalogError>().is_some() {
        return "CATALOG";
    }
    "ERROR"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_step_timeout() {
        let err = anyhow::Error::new(StepError::timeout("#acceptTerms", Duration::from_secs(1)));
        assert_eq!(classify(&err), "STEP_TIMEOUT");

        let err = anyhow::Error::new(StepError::missing("#loadMore"));
        assert_eq!(classify(&err), "ELEMENT_MISSING");
    }

    #[test]
    fn test_classify_context_wrapped() {
        use anyhow::Context;

        let err: anyhow::Result<()> = Err(CatalogError::UnknownCourt {
            fips: "001".to_string(),
        })
        .context("解析法院名称");
        assert_eq!(classify(&err.unwrap_err()), "CATALOG");

        let plain = anyhow::anyhow!("随便什么错误");
        assert_eq!(classify(&plain), "ERROR");
    }
}
