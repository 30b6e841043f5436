use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OCIS 落地页
    pub landing_url: String,
    /// 列表搜索接口（精确匹配）
    pub search_endpoint: String,
    /// 案件详情接口（精确匹配）
    pub details_endpoint: String,
    /// 列表模式分片数（同时打开的页面上限）
    pub listing_shards: usize,
    /// 详情模式分片数
    pub detail_shards: usize,
    /// 单步等待元素的上限（秒）
    pub step_timeout_secs: u64,
    /// 等待元素时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 落地页 network-idle 等待上限（秒）
    pub network_idle_timeout_secs: u64,
    /// 关闭页面后等待拦截器收尾的上限（毫秒）
    pub capture_drain_ms: u64,
    /// "Load More" 最大次数，None 表示不限制
    pub max_load_more: Option<usize>,
    /// 浏览器调试端口，设置后连接已有浏览器而不是启动新的
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 是否无头模式
    pub headless: bool,
    /// 静态列表目录（courtPicker.json / getLookupCodeDetails.json）
    pub static_dir: String,
    /// 输出目录
    pub data_dir: String,
    /// 运行日志文件
    pub run_log_file: String,
    /// 代码过滤配置文件
    pub filter_file: String,
    /// 是否显示进度行
    pub show_progress: bool,
    /// 进度行刷新间隔（毫秒）
    pub progress_refresh_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 查询日期，未设置时交互式询问
    pub lookup_date: Option<String>,
    /// 是否继续抓取详情，未设置时交互式询问
    pub fetch_details: Option<bool>,
    /// 代码过滤条件，未设置时交互式询问
    pub code_filters: Option<Vec<String>>,
    /// 列表模式节奏；TOML 中只需写出要改的字段
    #[serde(deserialize_with = "listing_pacing")]
    pub listing_pacing: Pacing,
    /// 详情模式节奏；未写出的字段沿用详情模式默认值
    #[serde(deserialize_with = "detail_pacing")]
    pub detail_pacing: Pacing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            landing_url: "https://eapps.courts.state.va.us/ocis/landing/false".to_string(),
            search_endpoint: "https://eapps.courts.state.va.us/ocis-rest/api/public/search"
                .to_string(),
            details_endpoint:
                "https://eapps.courts.state.va.us/ocis-rest/api/public/getCaseDetails".to_string(),
            listing_shards: 20,
            detail_shards: 25,
            step_timeout_secs: 300,
            poll_interval_ms: 100,
            network_idle_timeout_secs: 120,
            capture_drain_ms: 1_000,
            max_load_more: None,
            browser_debug_port: None,
            chrome_executable: None,
            headless: true,
            static_dir: "staticList".to_string(),
            data_dir: "data".to_string(),
            run_log_file: "logfile.log".to_string(),
            filter_file: "config.json".to_string(),
            show_progress: true,
            progress_refresh_ms: 100,
            verbose_logging: false,
            lookup_date: None,
            fetch_details: None,
            code_filters: None,
            listing_pacing: Pacing::listing(),
            detail_pacing: Pacing::detail(),
        }
    }
}

impl Config {
    /// 加载配置：`SCRAPER_CONFIG` 指向的 TOML 文件（默认 scraper.toml，不存在则跳过），再叠加环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var("SCRAPER_CONFIG").unwrap_or_else(|_| "scraper.toml".to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        let config = base.with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("无法解析配置文件: {}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Result<Self> {
        Ok(Self {
            landing_url: env_string("LANDING_URL").unwrap_or(self.landing_url),
            search_endpoint: env_string("SEARCH_ENDPOINT").unwrap_or(self.search_endpoint),
            details_endpoint: env_string("DETAILS_ENDPOINT").unwrap_or(self.details_endpoint),
            listing_shards: env_parse("LISTING_SHARDS")?.unwrap_or(self.listing_shards),
            detail_shards: env_parse("DETAIL_SHARDS")?.unwrap_or(self.detail_shards),
            step_timeout_secs: env_parse("STEP_TIMEOUT_SECS")?.unwrap_or(self.step_timeout_secs),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS")?.unwrap_or(self.poll_interval_ms),
            network_idle_timeout_secs: env_parse("NETWORK_IDLE_TIMEOUT_SECS")?
                .unwrap_or(self.network_idle_timeout_secs),
            capture_drain_ms: env_parse("CAPTURE_DRAIN_MS")?.unwrap_or(self.capture_drain_ms),
            max_load_more: env_parse("MAX_LOAD_MORE")?.or(self.max_load_more),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT")?.or(self.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(self.chrome_executable),
            headless: env_parse("HEADLESS")?.unwrap_or(self.headless),
            static_dir: env_string("STATIC_DIR").unwrap_or(self.static_dir),
            data_dir: env_string("DATA_DIR").unwrap_or(self.data_dir),
            run_log_file: env_string("RUN_LOG_FILE").unwrap_or(self.run_log_file),
            filter_file: env_string("FILTER_FILE").unwrap_or(self.filter_file),
            show_progress: env_parse("SHOW_PROGRESS")?.unwrap_or(self.show_progress),
            progress_refresh_ms: env_parse("PROGRESS_REFRESH_MS")?
                .unwrap_or(self.progress_refresh_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING")?.unwrap_or(self.verbose_logging),
            lookup_date: env_string("LOOKUP_DATE").or(self.lookup_date),
            fetch_details: env_parse("FETCH_DETAILS")?.or(self.fetch_details),
            code_filters: env_string("CODE_FILTERS")
                .map(|raw| split_list(&raw))
                .or(self.code_filters),
            listing_pacing: self.listing_pacing,
            detail_pacing: self.detail_pacing,
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing_shards == 0 {
            return Err(invalid("listing_shards", "必须 >= 1"));
        }
        if self.detail_shards == 0 {
            return Err(invalid("detail_shards", "必须 >= 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "必须 >= 1"));
        }
        for (name, pacing) in [
            ("listing_pacing", &self.listing_pacing),
            ("detail_pacing", &self.detail_pacing),
        ] {
            if pacing.type_delay_min_ms > pacing.type_delay_max_ms {
                return Err(invalid(name, "type_delay_min_ms 大于 type_delay_max_ms"));
            }
        }
        Ok(())
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.network_idle_timeout_secs)
    }

    pub fn capture_drain(&self) -> Duration {
        Duration::from_millis(self.capture_drain_ms)
    }

    pub fn progress_refresh(&self) -> Duration {
        Duration::from_millis(self.progress_refresh_ms)
    }
}

/// 每一步之间的固定停顿（毫秒），模拟人工操作并等待前端渲染
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pacing {
    /// 点击同意条款之后
    pub after_accept_ms: u64,
    /// 筛选面板每次点击之后
    pub step_pause_ms: u64,
    /// 输入法院名称之后、回车之前
    pub after_court_typed_ms: u64,
    /// 聚焦查询输入框之后
    pub before_query_ms: u64,
    /// 输入查询值之后
    pub after_query_typed_ms: u64,
    /// 点击搜索之后
    pub after_submit_ms: u64,
    /// 关闭声明弹窗之后
    pub after_ack_ms: u64,
    /// 无结果 / 维护时关闭前的停留
    pub terminal_linger_ms: u64,
    /// 有结果时关闭前的停留，给拦截器留出时间
    pub close_grace_ms: u64,
    /// 每次 "Load More" 之后
    pub load_more_settle_ms: u64,
    /// 每个字符之间的随机延迟下限
    pub type_delay_min_ms: u64,
    /// 每个字符之间的随机延迟上限
    pub type_delay_max_ms: u64,
}

impl Pacing {
    /// 列表模式的默认节奏
    pub fn listing() -> Self {
        Self {
            after_accept_ms: 5_000,
            step_pause_ms: 500,
            after_court_typed_ms: 200,
            before_query_ms: 100,
            after_query_typed_ms: 500,
            after_submit_ms: 4_000,
            after_ack_ms: 5_000,
            terminal_linger_ms: 0,
            close_grace_ms: 250,
            load_more_settle_ms: 2_500,
            type_delay_min_ms: 50,
            type_delay_max_ms: 100,
        }
    }

    /// 详情模式的默认节奏
    pub fn detail() -> Self {
        Self {
            after_accept_ms: 0,
            step_pause_ms: 250,
            after_court_typed_ms: 200,
            before_query_ms: 100,
            after_query_typed_ms: 250,
            after_submit_ms: 2_000,
            after_ack_ms: 4_000,
            terminal_linger_ms: 4_000,
            close_grace_ms: 250,
            load_more_settle_ms: 2_500,
            type_delay_min_ms: 50,
            type_delay_max_ms: 100,
        }
    }

    /// 全部为零，测试用
    pub fn immediate() -> Self {
        Self {
            after_accept_ms: 0,
            step_pause_ms: 0,
            after_court_typed_ms: 0,
            before_query_ms: 0,
            after_query_typed_ms: 0,
            after_submit_ms: 0,
            after_ack_ms: 0,
            terminal_linger_ms: 0,
            close_grace_ms: 0,
            load_more_settle_ms: 0,
            type_delay_min_ms: 0,
            type_delay_max_ms: 0,
        }
    }

    /// 为一个案件抽取打字速度，整个案件内保持不变
    pub fn random_type_delay(&self) -> Duration {
        let (min, max) = if self.type_delay_min_ms <= self.type_delay_max_ms {
            (self.type_delay_min_ms, self.type_delay_max_ms)
        } else {
            (self.type_delay_max_ms, self.type_delay_min_ms)
        };
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// 配置文件中的 `[listing_pacing]` / `[detail_pacing]` 表，只覆盖写出的字段
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingOverrides {
    pub after_accept_ms: Option<u64>,
    pub step_pause_ms: Option<u64>,
    pub after_court_typed_ms: Option<u64>,
    pub before_query_ms: Option<u64>,
    pub after_query_typed_ms: Option<u64>,
    pub after_submit_ms: Option<u64>,
    pub after_ack_ms: Option<u64>,
    pub terminal_linger_ms: Option<u64>,
    pub close_grace_ms: Option<u64>,
    pub load_more_settle_ms: Option<u64>,
    pub type_delay_min_ms: Option<u64>,
    pub type_delay_max_ms: Option<u64>,
}

impl PacingOverrides {
    /// 叠加到某个模式的默认节奏上
    pub fn apply(self, base: Pacing) -> Pacing {
        Pacing {
            after_accept_ms: self.after_accept_ms.unwrap_or(base.after_accept_ms),
            step_pause_ms: self.step_pause_ms.unwrap_or(base.step_pause_ms),
            after_court_typed_ms: self.after_court_typed_ms.unwrap_or(base.after_court_typed_ms),
            before_query_ms: self.before_query_ms.unwrap_or(base.before_query_ms),
            after_query_typed_ms: self.after_query_typed_ms.unwrap_or(base.after_query_typed_ms),
            after_submit_ms: self.after_submit_ms.unwrap_or(base.after_submit_ms),
            after_ack_ms: self.after_ack_ms.unwrap_or(base.after_ack_ms),
            terminal_linger_ms: self.terminal_linger_ms.unwrap_or(base.terminal_linger_ms),
            close_grace_ms: self.close_grace_ms.unwrap_or(base.close_grace_ms),
            load_more_settle_ms: self.load_more_settle_ms.unwrap_or(base.load_more_settle_ms),
            type_delay_min_ms: self.type_delay_min_ms.unwrap_or(base.type_delay_min_ms),
            type_delay_max_ms: self.type_delay_max_ms.unwrap_or(base.type_delay_max_ms),
        }
    }
}

fn listing_pacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pacing, D::Error> {
    Ok(PacingOverrides::deserialize(deserializer)?.apply(Pacing::listing()))
}

fn detail_pacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pacing, D::Error> {
    Ok(PacingOverrides::deserialize(deserializer)?.apply(Pacing::detail()))
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
    }
}

/// 逗号分隔的列表，去掉空项
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
