//! # Past Question Scraper
//!
//! 从分页题库站点抓取考试真题（题干、选项、答案、解析、考试类型、年份），
//! 逐条保存，并通过 SSE 实时推送抓取进度。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `PageSession` - 渲染页面会话（导航 / 等待元素 / 读取内容）
//! - `ListingFetcher` - 列表页 HTTP 抓取
//! - `browser/` - chromiumoxide 实现的 PageSession
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单页或单题
//! - `ListingExtractor` - 列表页解析
//! - `DetailEnricher` - 详情页答案与解析提取
//! - `QuestionSink` - 保存一道题
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个类别"的分页抓取流程
//! - `ScrapeRun` - 任务上下文（科目 + 会话 + 累计数 + 取消令牌）
//! - `CategoryCrawler` - 状态机（取页 → 解析 → 补全 → 保存）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 一个科目的完整任务，管理会话生命周期与首尾事件
//!
//! ### 边界
//! - `progress/` - 进度通道与会话注册表
//! - `server/` - axum 路由与 SSE

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{EnrichedQuestion, ProgressEvent, QuestionStub};
pub use orchestrator::{Pipeline, ScrapeRequest};
pub use progress::SessionRegistry;
pub use workflow::{CategoryCrawler, ScrapeRun};
