pub mod category_crawler;
pub mod run_ctx;

pub use category_crawler::{CategoryCrawler, CategoryReport, StopReason};
pub use run_ctx::ScrapeRun;
