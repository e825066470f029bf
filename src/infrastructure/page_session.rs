//! 渲染页面会话 - 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只暴露"导航 / 等待元素 / 读取内容"的能力

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;

/// 可控制的渲染页面会话
///
/// 职责：
/// - 导航到指定 URL（带超时）
/// - 等待元素出现（带超时）
/// - 返回客户端渲染后的 HTML
/// - 不认识 Question / Subject
///
/// 每个会话只属于一次抓取任务，不在任务间共享。
#[async_trait]
pub trait PageSession: Send {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> AppResult<()>;

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> AppResult<()>;

    async fn content(&mut self) -> AppResult<String>;

    /// 释放会话；调用后不得再使用
    async fn close(&mut self) -> AppResult<()>;
}

/// 会话工厂
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> AppResult<Box<dyn PageSession>>;
}
