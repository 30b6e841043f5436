//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（浏览器页面），只暴露能力，不关心法院和案件

pub mod cdp_page;
pub mod js_executor;
pub mod session_page;

pub use cdp_page::{CdpPage, ChromePages};
pub use js_executor::{IdleReport, JsExecutor};
pub use session_page::{ExchangeStream, NetworkExchange, PageSource, SessionPage};
