//! 抓取任务编排 - 编排层
//!
//! ## 职责
//!
//! 1. **资源管理**：为每次任务启动一个渲染页面会话，结束时无条件释放
//! 2. **通道解析**：任务开始时从注册表取一次进度通道，没有观察端也照常抓取
//! 3. **顺序调度**：按 objective → theory → practical 依次调用类别抓取流程
//! 4. **首尾事件**：每次任务恰好一个 start 和一个 end（completed: true）
//!
//! 会话启动失败是唯一不会产生 start/end 的情况，错误直接返回给调用方。

use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{HttpFetcher, ListingFetcher, PageSession, SessionLauncher};
use crate::models::{EventKind, QuestionCategory};
use crate::progress::{ProgressReporter, SessionRegistry};
use crate::services::{JsonlSink, QuestionSink};
use crate::utils::logging::{log_run_start, print_run_summary};
use crate::workflow::{CategoryCrawler, CategoryReport, ScrapeRun};

/// 触发一次抓取所需的参数
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub subject_name: String,
    pub subject_slug: String,
    pub session_id: String,
}

impl ScrapeRequest {
    pub fn new(
        subject_name: impl Into<String>,
        subject_slug: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            subject_slug: subject_slug.into(),
            session_id: session_id.into(),
        }
    }
}

/// 抓取流水线
pub struct Pipeline {
    launcher: Arc<dyn SessionLauncher>,
    crawler: CategoryCrawler,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn ListingFetcher>,
        launcher: Arc<dyn SessionLauncher>,
        sink: Arc<dyn QuestionSink>,
    ) -> AppResult<Self> {
        Ok(Self {
            launcher,
            crawler: CategoryCrawler::new(config, fetcher, sink)?,
        })
    }

    /// 使用真实的 HTTP 客户端、Chrome 和 JSON Lines 存储
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config,
            Arc::new(HttpFetcher::new(config)?),
            Arc::new(ChromeLauncher::new(config)),
            Arc::new(JsonlSink::new(&config.output_file)),
        )
    }

    /// 在后台运行，调用方不等待结果
    pub fn spawn(
        self: &Arc<Self>,
        request: ScrapeRequest,
        registry: SessionRegistry,
        cancel: CancellationToken,
    ) -> JoinHandle<AppResult<usize>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(&request, &registry, cancel).await })
    }

    /// 抓取一个科目的全部类别，返回成功保存的总数
    pub async fn run(
        &self,
        request: &ScrapeRequest,
        registry: &SessionRegistry,
        cancel: CancellationToken,
    ) -> AppResult<usize> {
        let mut session = self.launcher.launch().await.map_err(|e| {
            error!("❌ 无法启动渲染页面会话: {}", e);
            e
        })?;

        let progress = ProgressReporter::new(registry.get(&request.session_id));
        if !progress.is_attached() {
            debug!("会话 {} 没有观察端，进度事件将被丢弃", request.session_id);
        }

        let mut run = ScrapeRun::new(
            &request.subject_name,
            &request.subject_slug,
            &request.session_id,
            progress,
            cancel,
        );

        log_run_start(run.subject_name(), run.subject_slug(), run.session_id());
        run.emit(
            EventKind::Start,
            format!("🚀 Starting scrape for {}", run.subject_name()),
        );

        let outcome = self.crawl_all(session.as_mut(), &mut run).await;

        if let Err(e) = session.close().await {
            warn!("{} 关闭渲染页面会话失败: {}", run, e);
        }

        let total = run.total_scraped();
        match outcome {
            Ok(reports) => {
                print_run_summary(run.subject_name(), &reports, total);
                run.emit_terminal(EventKind::End, format!("🎉 Done! {} questions.", total));
                Ok(total)
            }
            Err(e) => {
                let message = match &e {
                    AppError::Cancelled => format!("🛑 Scrape stopped after {} questions.", total),
                    other => format!(
                        "❌ Scrape aborted after {} questions: {}",
                        total,
                        other.summary()
                    ),
                };
                run.emit_terminal(EventKind::End, message);
                Err(e)
            }
        }
    }

    async fn crawl_all(
        &self,
        session: &mut dyn PageSession,
        run: &mut ScrapeRun,
    ) -> AppResult<Vec<CategoryReport>> {
        let mut reports = Vec::with_capacity(QuestionCategory::ALL.len());
        for category in QuestionCategory::ALL {
            let report = self.crawler.crawl(session, category, run).await?;
            reports.push(report);
        }
        Ok(reports)
    }
}
