//! 测试用的脚本化页面
//!
//! `MockSite` 描述每个法院 / 案件在网站上的样子，`MockPage` 按 OCIS 页面的行为响应
//! 选择器操作，并在点击搜索 / Load More 时向交换流推送接口响应。
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use serde_json::{json, Value};

use ocis_scraper::browser::{PhaseSession, SessionLauncher};
use ocis_scraper::config::{Config, Pacing};
use ocis_scraper::infrastructure::{ExchangeStream, NetworkExchange, PageSource, SessionPage};
use ocis_scraper::workflow::selectors::*;

pub const LANDING: &str = "https://ocis.test/ocis/landing/false";
pub const SEARCH: &str = "https://ocis.test/ocis-rest/api/public/search";
pub const DETAILS: &str = "https://ocis.test/ocis-rest/api/public/getCaseDetails";

/// 测试配置：无停顿、短超时
pub fn test_config(run_log_name: &str) -> Config {
    Config {
        landing_url: LANDING.to_string(),
        search_endpoint: SEARCH.to_string(),
        details_endpoint: DETAILS.to_string(),
        listing_shards: 1,
        detail_shards: 1,
        step_timeout_secs: 1,
        poll_interval_ms: 10,
        network_idle_timeout_secs: 1,
        capture_drain_ms: 500,
        show_progress: false,
        run_log_file: temp_path(run_log_name).to_string_lossy().into_owned(),
        listing_pacing: Pacing::immediate(),
        detail_pacing: Pacing::immediate(),
        ..Config::default()
    }
}

/// 每个测试进程独立的临时文件路径
pub fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ocis_{}_{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path
}

/// 生成 `n` 行列表结果
pub fn rows(prefix: &str, n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "name": format!("{} DEFENDANT {}", prefix, i),
                "formattedCaseNumber": format!("GC{}{:05}-00", prefix, i),
                "qualifiedFips": "0131",
                "codeSection": "18.2-266",
                "hearingDateTime": "2024-01-16T09:00:00"
            })
        })
        .collect()
}

/// 网站脚本
pub struct MockSite {
    listings: HashMap<String, Vec<Vec<Value>>>,
    maintenance: HashSet<String>,
    extend: HashSet<String>,
    broken: HashSet<String>,
    details: HashMap<String, Value>,
    acknowledge: bool,
    court_matches: usize,
    missing: HashSet<String>,
    log: Mutex<Vec<String>>,
    opened: AtomicUsize,
    open_now: AtomicUsize,
    max_open: AtomicUsize,
}

impl Default for MockSite {
    fn default() -> Self {
        Self {
            listings: HashMap::new(),
            maintenance: HashSet::new(),
            extend: HashSet::new(),
            broken: HashSet::new(),
            details: HashMap::new(),
            acknowledge: false,
            court_matches: 1,
            missing: HashSet::new(),
            log: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
            open_now: AtomicUsize::new(0),
            max_open: AtomicUsize::new(0),
        }
    }
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// 法院的列表结果，每个元素是一次搜索 / Load More 返回的行；空 Vec 表示无结果
    pub fn with_court(mut self, court: &str, pages: Vec<Vec<Value>>) -> Self {
        self.listings.insert(court.to_string(), pages);
        self
    }

    pub fn with_maintenance(mut self, court: &str) -> Self {
        self.maintenance.insert(court.to_string());
        self
    }

    /// 结果页上出现 "Extend Session"，直到点击延长
    pub fn with_extend(mut self, court: &str) -> Self {
        self.extend.insert(court.to_string());
        self
    }

    /// 选择这个法院后 "应用" 按钮永远不出现
    pub fn with_broken(mut self, court: &str) -> Self {
        self.broken.insert(court.to_string());
        self
    }

    pub fn with_details(mut self, case_number: &str, payload: Value) -> Self {
        self.details.insert(case_number.to_string(), payload);
        self
    }

    pub fn with_acknowledge(mut self) -> Self {
        self.acknowledge = true;
        self
    }

    pub fn with_court_matches(mut self, n: usize) -> Self {
        self.court_matches = n;
        self
    }

    /// 某个选择器永远不出现
    pub fn without(mut self, selector: &str) -> Self {
        self.missing.insert(selector.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 所有页面的操作记录
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn pages_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn pages_open_now(&self) -> usize {
        self.open_now.load(Ordering::SeqCst)
    }

    pub fn max_pages_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    fn pages_for(&self, court: &str) -> &[Vec<Value>] {
        self.listings.get(court).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Default)]
struct PageState {
    focused: Option<String>,
    court_typed: String,
    query_typed: String,
    court: Option<String>,
    detail_mode: bool,
    searched: bool,
    acked: bool,
    extended: bool,
    shown_pages: usize,
    watched: Vec<String>,
    tx: Option<mpsc::UnboundedSender<NetworkExchange>>,
    closed: bool,
}

/// 脚本化页面
pub struct MockPage {
    site: Arc<MockSite>,
    state: Mutex<PageState>,
    actions: Mutex<Vec<String>>,
}

impl MockPage {
    pub fn new(site: Arc<MockSite>) -> Self {
        Self {
            site,
            state: Mutex::new(PageState::default()),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// 本页面的操作记录
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn act(&self, action: String) {
        self.site.log.lock().unwrap().push(action.clone());
        self.actions.lock().unwrap().push(action);
    }

    fn present(&self, state: &PageState, selector: &str) -> bool {
        if self.site.missing.contains(selector) {
            return false;
        }
        if selector == ACKNOWLEDGE {
            return self.site.acknowledge && state.searched && !state.acked;
        }
        if selector == APPLY_COURTS {
            let court = state.court.as_deref().unwrap_or_default();
            return !self.site.broken.contains(court);
        }
        true
    }

    fn emit(state: &PageState, url: &str, body: String) {
        if let Some(tx) = &state.tx {
            let body = state.watched.iter().any(|w| w == url).then_some(body);
            let _ = tx.unbounded_send(NetworkExchange::new(url, body));
        }
    }

    fn emit_listing_page(&self, state: &PageState, court: &str, index: usize) {
        let pages = self.site.pages_for(court);
        let total: usize = pages.iter().map(Vec::len).sum();
        let rows = pages.get(index).cloned().unwrap_or_default();
        let body = json!({
            "context": { "entity": { "payload": { "noOfRecords": total, "searchResults": rows } } }
        });
        Self::emit(state, SEARCH, body.to_string());
    }

    fn emit_details(&self, state: &PageState) {
        let payload = self
            .site
            .details
            .get(&state.query_typed)
            .cloned()
            .unwrap_or(Value::Null);
        let body = json!({ "context": { "entity": { "payload": payload } } });
        Self::emit(state, DETAILS, body.to_string());
    }
}

#[async_trait]
impl SessionPage for MockPage {
    async fn block_subresources(&self) -> Result<()> {
        self.act("block".to_string());
        Ok(())
    }

    async fn exchanges(&self, capture_bodies: &[String]) -> Result<ExchangeStream> {
        self.act("exchanges".to_string());
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.state.lock().unwrap();
        state.watched = capture_bodies.to_vec();
        state.tx = Some(tx);
        Ok(rx.boxed())
    }

    async fn goto_idle(&self, url: &str, _idle_timeout: Duration) -> Result<()> {
        self.act(format!("goto:{}", url));
        let state = self.state.lock().unwrap();
        Self::emit(&state, url, "<html>landing</html>".to_string());
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(self.present(&state, selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.present(&state, selector) {
            bail!("元素不存在: {}", selector);
        }
        self.act(format!("click:{}", selector));

        match selector {
            START_SEARCH => {
                state.searched = true;
                let court = state.court.clone().unwrap_or_default();
                if self.site.maintenance.contains(&court) {
                    return Ok(());
                }
                if state.detail_mode {
                    self.emit_details(&state);
                } else {
                    self.emit_listing_page(&state, &court, 0);
                }
            }
            LOAD_MORE => {
                state.shown_pages += 1;
                let court = state.court.clone().unwrap_or_default();
                let index = state.shown_pages;
                self.emit_listing_page(&state, &court, index);
            }
            EXTEND_SESSION => state.extended = true,
            ACKNOWLEDGE => state.acked = true,
            _ => {}
        }
        Ok(())
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.present(&state, selector) {
            bail!("元素不存在: {}", selector);
        }
        self.act(format!("focus:{}", selector));
        if selector == CASE_NUMBER_FIELD {
            state.detail_mode = true;
        }
        state.focused = Some(selector.to_string());
        Ok(())
    }

    async fn type_char(&self, ch: char) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let focused = state.focused.clone();
        match focused.as_deref() {
            Some(SEARCH_COURTS) => state.court_typed.push(ch),
            Some(DATE_FIELD) | Some(CASE_NUMBER_FIELD) => state.query_typed.push(ch),
            _ => {}
        }
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.act(format!(
            "enter:{}",
            state.focused.clone().unwrap_or_default()
        ));
        if state.focused.as_deref() == Some(SEARCH_COURTS) {
            state.court = Some(state.court_typed.clone());
        }
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.act(format!("count:{}", selector));
        if selector == COURT_MATCHES {
            return Ok(self.site.court_matches);
        }
        Ok(0)
    }

    async fn body_text(&self) -> Result<String> {
        self.act("body".to_string());
        let state = self.state.lock().unwrap();
        if !state.searched {
            return Ok("Online Case Information System".to_string());
        }
        if self.site.acknowledge && !state.acked {
            return Ok("Please Acknowledge the disclaimers to continue".to_string());
        }

        let court = state.court.clone().unwrap_or_default();
        if self.site.maintenance.contains(&court) {
            return Ok("The site is undergoing maintenance or updates.".to_string());
        }
        if state.detail_mode {
            return Ok(format!("Case Details {}", state.query_typed));
        }

        let pages = self.site.pages_for(&court);
        if pages.iter().all(Vec::is_empty) {
            return Ok("No Search Results found".to_string());
        }
        let mut body = format!("Search Results for {}", court);
        if self.site.extend.contains(&court) && !state.extended {
            body.push_str(" Extend Session");
        }
        if state.shown_pages + 1 < pages.len() {
            body.push_str(" Load More Results");
        }
        Ok(body)
    }

    async fn close(&self) -> Result<()> {
        self.act("close".to_string());
        let mut state = self.state.lock().unwrap();
        if !state.closed {
            state.closed = true;
            state.tx = None;
            self.site.open_now.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// 从 `MockSite` 打开页面
pub struct MockPages {
    site: Arc<MockSite>,
}

impl MockPages {
    pub fn new(site: Arc<MockSite>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl PageSource for MockPages {
    async fn open_page(&self) -> Result<Box<dyn SessionPage>> {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.site.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.site.max_open.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(MockPage::new(self.site.clone())))
    }
}

/// 每个阶段"启动"一次 `MockSite`，记录启动和关闭次数
pub struct MockLauncher {
    site: Arc<MockSite>,
    launched: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(site: Arc<MockSite>) -> Self {
        Self {
            site,
            launched: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    async fn launch(&self, _config: &Config) -> Result<Box<dyn PhaseSession>> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            pages: Arc::new(MockPages::new(self.site.clone())),
            closed: self.closed.clone(),
        }))
    }
}

struct MockSession {
    pages: Arc<dyn PageSource>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl PhaseSession for MockSession {
    fn pages(&self) -> Arc<dyn PageSource> {
        self.pages.clone()
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
