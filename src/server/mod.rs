//! HTTP 边界层：持有会话注册表，触发抓取任务，转发进度事件

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::orchestrator::Pipeline;
use crate::progress::SessionRegistry;

pub use routes::router;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub registry: SessionRegistry,
    /// 正在运行的任务：会话 ID → 取消令牌
    pub runs: Arc<DashMap<String, CancellationToken>>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, registry: SessionRegistry) -> Self {
        Self {
            pipeline,
            registry,
            runs: Arc::new(DashMap::new()),
        }
    }

    /// 取消全部正在运行的任务
    pub fn cancel_all(&self) {
        for entry in self.runs.iter() {
            entry.value().cancel();
        }
    }
}

/// 启动 HTTP 服务，Ctrl-C 时取消所有任务并退出
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听端口 {}", config.server_port))?;
    info!("🚀 Server running on port {}", config.server_port);

    let shutdown_state = state.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("收到退出信号，正在停止所有抓取任务...");
            shutdown_state.cancel_all();
        })
        .await
        .context("HTTP 服务异常退出")?;

    Ok(())
}
