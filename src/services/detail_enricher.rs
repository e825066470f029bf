//! 详情页补全服务 - 业务能力层
//!
//! 只负责"打开一道题的详情页，取出正确答案和解析"，
//! 任何失败都降级为缺失值，不向上抛出

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::PageSession;
use crate::models::{DetailOutcome, EventKind, QuestionStub};
use crate::workflow::ScrapeRun;

const ANSWER_SELECTOR: &str = "h5.text-success";
const ANSWER_LABEL: &str = "Correct Answer:";
const CONTAINER_SELECTOR: &str = "div.mb-4";
const HEADING_SELECTOR: &str = "h5";
const PARAGRAPH_SELECTOR: &str = "p";

/// 单道题的补全结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub detail: DetailOutcome,
    /// 详情页访问失败，detail 为空
    pub degraded: bool,
}

impl Enrichment {
    fn degraded() -> Self {
        Self {
            detail: DetailOutcome::default(),
            degraded: true,
        }
    }
}

/// 详情页补全服务
///
/// 职责：
/// - 驱动渲染页面会话访问详情页
/// - 提取答案与解析
/// - 失败时推送 warning 并返回空结果
pub struct DetailEnricher {
    navigation_timeout: Duration,
    answer_timeout: Duration,
    parser: DetailParser,
}

impl DetailEnricher {
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_timeouts(config.navigation_timeout(), config.answer_wait_timeout())
    }

    pub fn with_timeouts(navigation_timeout: Duration, answer_timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            navigation_timeout,
            answer_timeout,
            parser: DetailParser::new()?,
        })
    }

    /// 访问详情页并提取答案和解析
    ///
    /// 导航 / 等待 / 解析任一步失败都会推送 warning 并返回降级结果；
    /// 任务被取消时静默返回降级结果，由调用方检查取消状态。
    pub async fn enrich(
        &self,
        session: &mut dyn PageSession,
        stub: &QuestionStub,
        run: &ScrapeRun,
    ) -> Enrichment {
        let cancel = run.cancel_token().clone();
        let attempt = tokio::select! {
            _ = cancel.cancelled() => return Enrichment::degraded(),
            attempt = self.try_enrich(session, &stub.detail_link) => attempt,
        };

        match attempt {
            Ok(detail) => Enrichment {
                detail,
                degraded: false,
            },
            Err(e) => {
                run.emit(
                    EventKind::Warning,
                    format!("⚠️ Detail scrape failed: {}", e.summary()),
                );
                Enrichment::degraded()
            }
        }
    }

    async fn try_enrich(
        &self,
        session: &mut dyn PageSession,
        detail_link: &str,
    ) -> AppResult<DetailOutcome> {
        session.navigate(detail_link, self.navigation_timeout).await?;
        session
            .wait_for_selector(ANSWER_SELECTOR, self.answer_timeout)
            .await?;
        let markup = session.content().await?;
        let detail = self.parser.parse(&markup)?;
        debug!(
            "详情页解析完成: 答案 {:?}, 解析 {}",
            detail.answer,
            if detail.explanation.is_some() { "有" } else { "无" }
        );
        Ok(detail)
    }
}

/// 详情页 HTML 解析
pub struct DetailParser {
    answer: Selector,
    container: Selector,
    heading: Selector,
    paragraph: Selector,
}

impl DetailParser {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            answer: selector(ANSWER_SELECTOR)?,
            container: selector(CONTAINER_SELECTOR)?,
            heading: selector(HEADING_SELECTOR)?,
            paragraph: selector(PARAGRAPH_SELECTOR)?,
        })
    }

    /// 缺少正确答案标题视为失败；缺少解析只是 None
    pub fn parse(&self, markup: &str) -> AppResult<DetailOutcome> {
        let document = Html::parse_document(markup);

        let heading = document.select(&self.answer).next().ok_or_else(|| {
            AppError::Browser(BrowserError::ElementMissing {
                selector: ANSWER_SELECTOR.to_string(),
            })
        })?;
        let heading_text = heading.text().collect::<String>();
        let answer = non_empty(heading_text.replacen(ANSWER_LABEL, "", 1).trim());

        let explanation = document
            .select(&self.container)
            .find(|container| {
                container.select(&self.heading).any(|h| {
                    h.text().collect::<String>().trim().to_lowercase() == "explanation"
                })
            })
            .and_then(|container| {
                container
                    .select(&self.paragraph)
                    .next()
                    .and_then(|p| non_empty(p.text().collect::<String>().trim()))
            });

        Ok(DetailOutcome {
            answer,
            explanation,
        })
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Other(format!("无效的选择器 {}: {}", css, e)))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"
        <html><body>
          <div class="mb-4"><h5>Question</h5><p>Which is a vector?</p></div>
          <h5 class="text-success mb-3">Correct Answer: Option B</h5>
          <div class="mb-4">
            <h5> Explanation </h5>
            <p>  Velocity has both magnitude and direction.  </p>
            <p>Second paragraph is ignored.</p>
          </div>
        </body></html>
    "#;

    #[test]
    fn parses_answer_and_explanation() {
        let detail = DetailParser::new().unwrap().parse(DETAIL).unwrap();
        assert_eq!(detail.answer.as_deref(), Some("Option B"));
        assert_eq!(
            detail.explanation.as_deref(),
            Some("Velocity has both magnitude and direction.")
        );
    }

    #[test]
    fn missing_explanation_is_none() {
        let html = r#"<h5 class="text-success">Correct Answer: C</h5><div class="mb-4"><h5>Comments</h5><p>x</p></div>"#;
        let detail = DetailParser::new().unwrap().parse(html).unwrap();
        assert_eq!(detail.answer.as_deref(), Some("C"));
        assert_eq!(detail.explanation, None);
    }

    #[test]
    fn empty_explanation_paragraph_is_none() {
        let html = r#"<h5 class="text-success">Correct Answer: A</h5><div class="mb-4"><h5>explanation</h5><p>   </p></div>"#;
        let detail = DetailParser::new().unwrap().parse(html).unwrap();
        assert_eq!(detail.explanation, None);
    }

    #[test]
    fn missing_answer_heading_is_an_error() {
        let err = DetailParser::new()
            .unwrap()
            .parse("<html><body><p>404</p></body></html>")
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Browser(BrowserError::ElementMissing { .. })
        ));
    }
}
