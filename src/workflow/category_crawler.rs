//! 类别抓取流程 - 流程层
//!
//! 核心职责：定义"一个题目类别"的完整抓取流程
//!
//! 状态机：
//! FETCH_PAGE → PARSE → (空页 ? STOP : PROCESS) → FETCH_PAGE(下一页)
//!
//! - 列表页请求失败：推送 error，结束本类别分页（不重试）
//! - 没有题目块：推送 warning，正常结束
//! - 有题目块但全部无法解析：推送 warning，继续下一页
//! - 每道题：详情补全 → 保存，逐条推送进度

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::{ListingFetcher, PageSession};
use crate::models::{EnrichedQuestion, EventKind, QuestionCategory, QuestionStub};
use crate::services::{DetailEnricher, ListingExtractor, QuestionSink};
use crate::utils::logging::truncate_text;
use crate::workflow::run_ctx::ScrapeRun;

/// 分页结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 遇到空页，数据已取完
    Exhausted,
    /// 列表页请求失败
    FetchFailed,
}

/// 单个类别的抓取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: QuestionCategory,
    /// 本类别成功保存的数量
    pub saved: usize,
    /// 处理过的非空页数
    pub pages_processed: u32,
    pub stop: StopReason,
}

enum CrawlState {
    FetchPage { page: u32 },
    Parse { page: u32, markup: String },
    Process { page: u32, stubs: Vec<QuestionStub> },
    Done(StopReason),
}

/// 类别抓取流程
///
/// - 不持有渲染页面会话，由编排层借出
/// - 只依赖业务能力（services）和基础设施接口
pub struct CategoryCrawler {
    base_url: Url,
    listing_exam_type: String,
    extractor: ListingExtractor,
    enricher: DetailEnricher,
    fetcher: Arc<dyn ListingFetcher>,
    sink: Arc<dyn QuestionSink>,
}

impl CategoryCrawler {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn ListingFetcher>,
        sink: Arc<dyn QuestionSink>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            listing_exam_type: config.listing_exam_type.clone(),
            extractor: ListingExtractor::new(&config.base_url)?,
            enricher: DetailEnricher::new(config)?,
            fetcher,
            sink,
        })
    }

    /// 列表页地址
    pub fn listing_url(
        &self,
        subject_slug: &str,
        category: QuestionCategory,
        page: u32,
    ) -> AppResult<String> {
        let mut url = self
            .base_url
            .join(&format!("classroom/{}", subject_slug))
            .map_err(|e| {
                AppError::Other(format!(
                    "cannot build listing url for {}: {}",
                    subject_slug, e
                ))
            })?;
        url.query_pairs_mut()
            .append_pair("exam_type", &self.listing_exam_type)
            .append_pair("question_type", category.as_str())
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }

    /// 抓取一个类别的全部分页
    ///
    /// 只有取消会返回 Err；请求、补全、保存失败都在内部消化。
    pub async fn crawl(
        &self,
        session: &mut dyn PageSession,
        category: QuestionCategory,
        run: &mut ScrapeRun,
    ) -> AppResult<CategoryReport> {
        info!("{} 📂 开始抓取类别: {}", run, category);

        let mut saved = 0;
        let mut pages_processed = 0;
        let mut state = CrawlState::FetchPage { page: 1 };

        loop {
            state = match state {
                CrawlState::FetchPage { page } => {
                    run.ensure_active()?;
                    run.emit(
                        EventKind::Info,
                        format!(
                            "📄 Scraping {} page {}",
                            category.as_str().to_uppercase(),
                            page
                        ),
                    );

                    let url = self.listing_url(run.subject_slug(), category, page)?;
                    match run.guard(self.fetcher.fetch(&url)).await {
                        Ok(markup) => CrawlState::Parse { page, markup },
                        Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                        Err(e) => {
                            run.emit(
                                EventKind::Error,
                                format!(
                                    "❌ Fetch failed for page {}: {}",
                                    page,
                                    e.summary()
                                ),
                            );
                            CrawlState::Done(StopReason::FetchFailed)
                        }
                    }
                }

                CrawlState::Parse { page, markup } => {
                    let listing = self.extractor.extract(&markup);
                    if listing.is_exhausted() {
                        run.emit(
                            EventKind::Warning,
                            format!("🛑 No {} questions found. Moving on.", category),
                        );
                        CrawlState::Done(StopReason::Exhausted)
                    } else {
                        debug!(
                            "{} 第 {} 页: {} 个题目块, {} 道题目",
                            run,
                            page,
                            listing.blocks,
                            listing.stubs.len()
                        );
                        if listing.skipped() > 0 {
                            run.emit(
                                EventKind::Warning,
                                format!(
                                    "⚠️ Skipped {} question(s) without a detail link on page {}",
                                    listing.skipped(),
                                    page
                                ),
                            );
                        }
                        CrawlState::Process {
                            page,
                            stubs: listing.stubs,
                        }
                    }
                }

                CrawlState::Process { page, stubs } => {
                    for stub in stubs {
                        if self.process_stub(session, category, stub, run).await? {
                            saved += 1;
                        }
                    }
                    pages_processed += 1;
                    CrawlState::FetchPage { page: page + 1 }
                }

                CrawlState::Done(stop) => {
                    let report = CategoryReport {
                        category,
                        saved,
                        pages_processed,
                        stop,
                    };
                    info!(
                        "{} ✓ 类别 {} 完成: 保存 {} 道, {} 页, 结束原因 {:?}",
                        run, category, report.saved, report.pages_processed, report.stop
                    );
                    return Ok(report);
                }
            };
        }
    }

    /// 处理一道题：补全 → 保存。返回是否保存成功
    async fn process_stub(
        &self,
        session: &mut dyn PageSession,
        category: QuestionCategory,
        stub: QuestionStub,
        run: &mut ScrapeRun,
    ) -> AppResult<bool> {
        run.ensure_active()?;
        debug!("{} 题干: {}", run, truncate_text(&stub.question, 80));
        run.emit(
            EventKind::Info,
            format!("🔗 Visiting detail: {}", stub.detail_link),
        );

        let enrichment = self.enricher.enrich(session, &stub, run).await;
        run.ensure_active()?;
        if !enrichment.degraded {
            run.emit(EventKind::Success, "✅ Scraped answer & explanation");
        }

        let record =
            EnrichedQuestion::new(stub, enrichment.detail, run.subject_name(), category);

        match run.guard(self.sink.save(&record)).await {
            Ok(()) => {
                let total = run.record_saved();
                run.emit(EventKind::Saved, format!("💾 Saved question #{}", total));
                Ok(true)
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                run.emit(EventKind::Error, format!("❌ Save error: {}", e.summary()));
                Ok(false)
            }
        }
    }
}
