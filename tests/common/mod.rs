#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use past_question_scraper::error::{AppError, AppResult, BrowserError, FetchError, StorageError};
use past_question_scraper::infrastructure::{ListingFetcher, PageSession, SessionLauncher};
use past_question_scraper::models::{EnrichedQuestion, ProgressEvent, QuestionCategory};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const BASE: &str = "https://myschool.ng";

// ========== 页面构造 ==========

/// 生成含 n 道题的列表页，详情链接为 /classroom/{slug}/{tag}-{i}
pub fn listing_page(slug: &str, tag: &str, n: usize) -> String {
    let blocks: String = (0..n)
        .map(|i| {
            format!(
                r#"<div class="media"><div class="media-body">
                    <div class="question-desc">{tag} question {i}?</div>
                    <ul class="list-unstyled">
                      <li><strong>A.</strong> first</li>
                      <li><strong>B.</strong> second</li>
                    </ul>
                    <span class="badge bg-success text-light">WAEC 2018</span>
                    <a class="btn btn-outline-danger" href="/classroom/{slug}/{tag}-{i}">View</a>
                </div></div>"#
            )
        })
        .collect();
    format!("<html><body>{blocks}</body></html>")
}

/// 有题目块但都缺少详情链接
pub fn linkless_page(n: usize) -> String {
    let blocks: String = (0..n)
        .map(|i| {
            format!(
                r#"<div class="media"><div class="media-body">
                    <div class="question-desc">orphan question {i}?</div>
                    <span class="badge bg-success text-light">WAEC 2018</span>
                </div></div>"#
            )
        })
        .collect();
    format!("<html><body>{blocks}</body></html>")
}

pub fn empty_page() -> String {
    "<html><body><p>No more questions</p></body></html>".to_string()
}

pub fn detail_page(answer: &str, explanation: &str) -> String {
    format!(
        r#"<html><body>
            <h5 class="text-success">Correct Answer: {answer}</h5>
            <div class="mb-4"><h5>Explanation</h5><p>{explanation}</p></div>
        </body></html>"#
    )
}

pub fn detail_link(slug: &str, tag: &str, i: usize) -> String {
    format!("{BASE}/classroom/{slug}/{tag}-{i}")
}

// ========== 列表页 ==========

/// 按 (类别, 页码) 返回预设内容；未设置的页返回空页
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<(String, u32), Result<String, String>>>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, category: QuestionCategory, page: u32, html: String) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((category.as_str().to_string(), page), Ok(html));
        self
    }

    pub fn failing_page(self, category: QuestionCategory, page: u32, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((category.as_str().to_string(), page), Err(message.to_string()));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// 已请求的 (类别, 页码)
    pub fn fetched_pages(&self) -> Vec<(String, u32)> {
        self.fetched()
            .iter()
            .map(|u| parse_listing_url(u))
            .collect()
    }
}

fn parse_listing_url(url: &str) -> (String, u32) {
    let url = Url::parse(url).unwrap();
    let mut category = String::new();
    let mut page = 0;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "question_type" => category = v.to_string(),
            "page" => page = v.parse().unwrap(),
            _ => {}
        }
    }
    (category, page)
}

#[async_trait]
impl ListingFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        let key = parse_listing_url(url);
        match self.pages.lock().unwrap().get(&key).cloned() {
            Some(Ok(html)) => Ok(html),
            Some(Err(message)) => Err(FetchError::BadStatus {
                url: format!("{url} ({message})"),
                status: 500,
            }
            .into()),
            None => Ok(empty_page()),
        }
    }
}

// ========== 渲染页面会话 ==========

#[derive(Clone)]
pub enum DetailBehavior {
    Page(String),
    NavigationTimeout,
    SelectorTimeout,
}

#[derive(Default)]
pub struct SessionLog {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl SessionLog {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

pub struct FakeSession {
    behaviors: Arc<HashMap<String, DetailBehavior>>,
    default_page: String,
    current: Option<String>,
    log: Arc<SessionLog>,
}

impl FakeSession {
    pub fn new(behaviors: HashMap<String, DetailBehavior>, log: Arc<SessionLog>) -> Self {
        Self {
            behaviors: Arc::new(behaviors),
            default_page: detail_page("A", "Because it is."),
            current: None,
            log,
        }
    }

    fn behavior(&self, url: &str) -> DetailBehavior {
        self.behaviors
            .get(url)
            .cloned()
            .unwrap_or_else(|| DetailBehavior::Page(self.default_page.clone()))
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> AppResult<()> {
        self.log.navigations.lock().unwrap().push(url.to_string());
        match self.behavior(url) {
            DetailBehavior::NavigationTimeout => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
            .into()),
            _ => {
                self.current = Some(url.to_string());
                Ok(())
            }
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> AppResult<()> {
        let url = self.current.clone().unwrap_or_default();
        match self.behavior(&url) {
            DetailBehavior::SelectorTimeout => Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    async fn content(&mut self) -> AppResult<String> {
        let url = self.current.clone().unwrap_or_default();
        match self.behavior(&url) {
            DetailBehavior::Page(html) => Ok(html),
            _ => Ok(String::new()),
        }
    }

    async fn close(&mut self) -> AppResult<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeLauncher {
    behaviors: HashMap<String, DetailBehavior>,
    pub log: Arc<SessionLog>,
    fail: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            log: Arc::new(SessionLog::default()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_behavior(mut self, url: String, behavior: DetailBehavior) -> Self {
        self.behaviors.insert(url, behavior);
        self
    }

    pub fn session(&self) -> FakeSession {
        FakeSession::new(self.behaviors.clone(), self.log.clone())
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self) -> AppResult<Box<dyn PageSession>> {
        if self.fail {
            return Err(AppError::launch_failed(std::io::Error::other(
                "chrome not found",
            )));
        }
        self.log.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.session()))
    }
}

// ========== 存储 ==========

#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<EnrichedQuestion>>,
    attempts: AtomicUsize,
    fail_all: bool,
    cancel_on_save: Option<CancellationToken>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// 第一次保存时触发取消，模拟任务中途出现不可恢复错误
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_save: Some(token),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<EnrichedQuestion> {
        self.saved.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl past_question_scraper::services::QuestionSink for RecordingSink {
    async fn save(&self, question: &EnrichedQuestion) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_save {
            token.cancel();
            std::future::pending::<()>().await;
        }
        if self.fail_all {
            return Err(StorageError::Validation {
                reason: "database unavailable".to_string(),
            }
            .into());
        }
        self.saved.lock().unwrap().push(question.clone());
        Ok(())
    }
}

// ========== 事件 ==========

pub fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
