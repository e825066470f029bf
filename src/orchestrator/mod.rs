//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::Pipeline (一个科目，持有渲染页面会话)
//!     ↓
//! workflow::CategoryCrawler (一个类别的分页)
//!     ↓
//! services (能力层：列表解析 / 详情补全 / 存储)
//!     ↓
//! infrastructure (基础设施：PageSession / ListingFetcher)
//! ```
//!
//! 只有编排层持有渲染页面会话；流程层只借用。

pub mod pipeline;

pub use pipeline::{Pipeline, ScrapeRequest};
