//! 抓取任务上下文
//!
//! 封装"我正在为哪个会话抓哪个科目、已经保存了多少道"这一信息

use std::fmt::Display;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::models::{EventKind, ProgressEvent};
use crate::progress::ProgressReporter;

/// 单次抓取任务的状态
///
/// 由编排层创建，各类别按顺序共享同一个计数器；
/// 计数只在保存成功时递增。
#[derive(Debug)]
pub struct ScrapeRun {
    subject_name: String,
    subject_slug: String,
    session_id: String,
    total_scraped: usize,
    progress: ProgressReporter,
    cancel: CancellationToken,
}

impl ScrapeRun {
    pub fn new(
        subject_name: impl Into<String>,
        subject_slug: impl Into<String>,
        session_id: impl Into<String>,
        progress: ProgressReporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            subject_slug: subject_slug.into(),
            session_id: session_id.into(),
            total_scraped: 0,
            progress,
            cancel,
        }
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn subject_slug(&self) -> &str {
        &self.subject_slug
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn total_scraped(&self) -> usize {
        self.total_scraped
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// 保存成功后调用，返回新的累计数
    pub fn record_saved(&mut self) -> usize {
        self.total_scraped += 1;
        self.total_scraped
    }

    /// 推送事件，附带当前累计数
    pub fn emit(&self, kind: EventKind, message: impl Into<String>) {
        self.progress
            .emit(ProgressEvent::new(kind, message, self.total_scraped));
    }

    /// 推送终止事件（completed: true），每次任务只调用一次
    pub fn emit_terminal(&self, kind: EventKind, message: impl Into<String>) {
        self.progress
            .emit(ProgressEvent::terminal(kind, message, self.total_scraped));
    }

    /// 已取消时返回 Err(Cancelled)
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 让挂起点可以被取消
    pub async fn guard<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}

impl Display for ScrapeRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[会话 {} 科目 {} ({})]",
            self.session_id, self.subject_name, self.subject_slug
        )
    }
}
