//! 列表页解析服务 - 业务能力层
//!
//! 只负责"从一页 HTML 中取出题目列表"，不发请求、不关心分页

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{ExamType, QuestionStub};

const BLOCK_SELECTOR: &str = ".media-body";
const QUESTION_SELECTOR: &str = ".question-desc";
const OPTION_SELECTOR: &str = "ul.list-unstyled li";
const OPTION_LABEL_SELECTOR: &str = "strong";
const DETAIL_LINK_SELECTOR: &str = "a.btn-outline-danger";
const BADGE_SELECTOR: &str = ".badge.bg-success.text-light";

const UNKNOWN_YEAR: &str = "Unknown";

/// 一页列表的解析结果
///
/// 分页是否结束只看题目块数量；有题目块但都缺少详情链接时
/// `stubs` 为空，仍需继续翻页。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// 页面上的题目块数量（含被跳过的）
    pub blocks: usize,
    pub stubs: Vec<QuestionStub>,
}

impl ListingPage {
    /// 没有任何题目块，分页结束
    pub fn is_exhausted(&self) -> bool {
        self.blocks == 0
    }

    /// 被跳过的题目块数量
    pub fn skipped(&self) -> usize {
        self.blocks - self.stubs.len()
    }
}

/// 列表页解析器
pub struct ListingExtractor {
    base_url: Url,
    block: Selector,
    question: Selector,
    option: Selector,
    option_label: Selector,
    detail_link: Selector,
    badge: Selector,
    badge_pattern: Regex,
}

impl ListingExtractor {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            reason: e.to_string(),
        })?;
        let badge_pattern = Regex::new(r"(?i)(WAEC|NECO|JAMB)\s+(\d{4})")
            .map_err(|e| AppError::Other(e.to_string()))?;

        Ok(Self {
            base_url,
            block: selector(BLOCK_SELECTOR)?,
            question: selector(QUESTION_SELECTOR)?,
            option: selector(OPTION_SELECTOR)?,
            option_label: selector(OPTION_LABEL_SELECTOR)?,
            detail_link: selector(DETAIL_LINK_SELECTOR)?,
            badge: selector(BADGE_SELECTOR)?,
            badge_pattern,
        })
    }

    /// 解析列表页；`blocks == 0` 是分页结束信号
    pub fn extract(&self, markup: &str) -> ListingPage {
        let document = Html::parse_document(markup);
        let mut blocks = 0;
        let mut stubs = Vec::new();

        for (index, block) in document.select(&self.block).enumerate() {
            blocks += 1;
            let Some(href) = block
                .select(&self.detail_link)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                warn!("第 {} 个题目块缺少详情链接，已跳过", index + 1);
                continue;
            };

            let Some(detail_link) = self.resolve_link(href) else {
                warn!("无法解析详情链接: {}", href);
                continue;
            };

            let question = block
                .select(&self.question)
                .next()
                .map(element_text)
                .unwrap_or_default();

            let options = block
                .select(&self.option)
                .map(|li| self.format_option(li))
                .collect();

            let badge = block
                .select(&self.badge)
                .next()
                .map(element_text)
                .unwrap_or_default();
            let (exam_type, year) = self.parse_badge(&badge);

            stubs.push(QuestionStub {
                question,
                options,
                detail_link,
                exam_type,
                year,
            });
        }

        debug!("本页 {} 个题目块，解析出 {} 道题目", blocks, stubs.len());
        ListingPage { blocks, stubs }
    }

    /// 相对链接转为绝对链接，绝对链接原样返回
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        self.base_url.join(href).ok().map(String::from)
    }

    /// 从徽章文字中取考试类型和年份，匹配失败时为 WAEC / "Unknown"
    pub fn parse_badge(&self, badge: &str) -> (ExamType, String) {
        self.badge_pattern
            .captures(badge)
            .and_then(|caps| {
                let exam_type = ExamType::parse(caps.get(1)?.as_str())?;
                Some((exam_type, caps.get(2)?.as_str().to_string()))
            })
            .unwrap_or_else(|| (ExamType::default(), UNKNOWN_YEAR.to_string()))
    }

    fn format_option(&self, li: ElementRef<'_>) -> String {
        let label: String = li
            .select(&self.option_label)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("");
        let full = li.text().collect::<String>();

        if label.is_empty() {
            return full.trim().to_string();
        }

        let rest = full.replacen(&label, "", 1);
        format!("{} {}", label, rest.trim())
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Other(format!("无效的选择器 {}: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
