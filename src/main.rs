use std::sync::Arc;

use anyhow::Result;
use past_question_scraper::config::Config;
use past_question_scraper::orchestrator::Pipeline;
use past_question_scraper::progress::SessionRegistry;
use past_question_scraper::server::{self, AppState};
use past_question_scraper::{logger, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logger::init(config.verbose_logging);
    utils::logging::log_startup(&config);

    // 组装流水线并启动服务
    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    let state = AppState::new(pipeline, SessionRegistry::new());

    server::serve(&config, state).await
}
