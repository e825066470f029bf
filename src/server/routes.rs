//! HTTP 路由
//!
//! - `GET  /api/subjects`                      科目目录
//! - `GET  /api/scraping-events/{session_id}`  进度事件流 (SSE)
//! - `POST /api/start-scraping`                启动一次抓取
//! - `POST /api/stop-scraping/{session_id}`    请求停止抓取

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::mapref::entry::Entry;
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::models::{EventKind, ProgressEvent, Subject};
use crate::orchestrator::ScrapeRequest;
use crate::progress::SessionRegistry;

const MISSING_FIELDS: &str = "Missing required fields: subjectName, subjectSlug, sessionId";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/subjects", get(list_subjects))
        .route("/api/scraping-events/{session_id}", get(scraping_events))
        .route("/api/start-scraping", post(start_scraping))
        .route("/api/stop-scraping/{session_id}", post(stop_scraping))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_subjects() -> Json<&'static [Subject]> {
    Json(Subject::catalog())
}

/// 连接断开时注销通道
struct DisconnectGuard {
    registry: SessionRegistry,
    session_id: String,
    channel_id: u64,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self
            .registry
            .remove_if_current(&self.session_id, self.channel_id)
        {
            debug!("观察端断开，已注销会话 {}", self.session_id);
        }
    }
}

async fn scraping_events(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (channel, rx) = state.registry.register(&session_id);
    info!("🔌 观察端已连接: {}", session_id);

    channel.write(ProgressEvent::new(
        EventKind::Connected,
        "Connected to scraping events",
        0,
    ));

    let guard = DisconnectGuard {
        registry: state.registry.clone(),
        session_id,
        channel_id: channel.id(),
    };

    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        let _guard = &guard;
        Event::default().json_data(&event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartScrapingBody {
    subject_name: Option<String>,
    subject_slug: Option<String>,
    session_id: Option<String>,
}

impl StartScrapingBody {
    fn into_request(self) -> Option<ScrapeRequest> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(ScrapeRequest::new(
            present(self.subject_name)?,
            present(self.subject_slug)?,
            present(self.session_id)?,
        ))
    }
}

async fn start_scraping(
    State(state): State<AppState>,
    Json(body): Json<StartScrapingBody>,
) -> Response {
    let Some(request) = body.into_request() else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_FIELDS }))).into_response();
    };

    let cancel = CancellationToken::new();
    match state.runs.entry(request.session_id.clone()) {
        Entry::Occupied(_) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Scraping already running for this session" })),
            )
                .into_response();
        }
        Entry::Vacant(slot) => {
            slot.insert(cancel.clone());
        }
    }

    info!(
        "📥 收到抓取请求: {} ({}) 会话 {}",
        request.subject_name, request.subject_slug, request.session_id
    );

    let session_id = request.session_id.clone();
    launch_run(&state, request, cancel);

    Json(json!({
        "message": "Scraping started successfully",
        "sessionId": session_id,
    }))
    .into_response()
}

/// 后台运行抓取，结束后清理并处理会话启动失败
fn launch_run(state: &AppState, request: ScrapeRequest, cancel: CancellationToken) {
    let session_id = request.session_id.clone();
    let handle = state
        .pipeline
        .spawn(request, state.registry.clone(), cancel);
    let runs = state.runs.clone();
    let registry = state.registry.clone();

    tokio::spawn(async move {
        let result = handle.await;
        runs.remove(&session_id);

        let failure = match result {
            Ok(Ok(total)) => {
                info!("✅ 会话 {} 抓取结束，共 {} 道", session_id, total);
                return;
            }
            // 编排层已推送 end 事件
            Ok(Err(e)) if !e.is_launch_failure() => {
                warn!("会话 {} 抓取提前结束: {}", session_id, e);
                return;
            }
            Ok(Err(e)) => e.summary(),
            Err(join_error) => {
                error!("会话 {} 抓取任务异常退出: {}", session_id, join_error);
                join_error.to_string()
            }
        };

        if let Some(channel) = registry.get(&session_id) {
            channel.write(ProgressEvent::terminal(
                EventKind::Error,
                format!("❌ Scraping failed: {}", failure),
                0,
            ));
        }
    });
}

async fn stop_scraping(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.runs.get(&session_id) {
        Some(token) => {
            token.cancel();
            info!("🛑 已请求停止会话 {}", session_id);
            Json(json!({ "message": "Stop requested", "sessionId": session_id })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No active scraping for this session" })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_missing() {
        let body = StartScrapingBody {
            subject_name: Some("Physics".to_string()),
            subject_slug: Some("  ".to_string()),
            session_id: Some("abc".to_string()),
        };
        assert!(body.into_request().is_none());
        assert!(StartScrapingBody::default().into_request().is_none());
    }

    #[test]
    fn complete_body_becomes_request() {
        let body: StartScrapingBody = serde_json::from_str(
            r#"{"subjectName":"Physics","subjectSlug":"physics","sessionId":"abc"}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_request(),
            Some(ScrapeRequest::new("Physics", "physics", "abc"))
        );
    }
}
