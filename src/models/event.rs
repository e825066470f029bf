use serde::{Deserialize, Serialize};

/// 进度事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// 观察端刚建立连接
    Connected,
    Start,
    Info,
    Warning,
    Error,
    Success,
    Saved,
    End,
}

/// 推送给观察端的进度事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    pub total_scraped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ProgressEvent {
    pub fn new(kind: EventKind, message: impl Into<String>, total_scraped: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            total_scraped,
            completed: None,
        }
    }

    /// 终止事件，观察端收到后关闭连接
    pub fn terminal(kind: EventKind, message: impl Into<String>, total_scraped: usize) -> Self {
        Self {
            completed: Some(true),
            ..Self::new(kind, message, total_scraped)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.completed == Some(true)
    }

    /// 渲染为 event-stream 帧：`data: <json>\n\n`
    pub fn to_sse_frame(&self) -> serde_json::Result<String> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}
