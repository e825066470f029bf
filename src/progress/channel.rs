//! 进度通道
//!
//! 单向事件通道，绑定到一个会话 ID。发送端由抓取任务持有，
//! 接收端交给 SSE 连接。

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::models::{EventKind, ProgressEvent};

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// 进度事件发送端
#[derive(Debug, Clone)]
pub struct ProgressChannel {
    id: u64,
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressChannel {
    /// 创建通道，返回发送端与接收端
    pub fn open() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// 推送事件；观察端已断开时返回 false
    pub fn write(&self, event: ProgressEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// 单次任务使用的进度上报器
///
/// 通道在任务开始时解析一次；没有观察端时事件直接丢弃。
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    channel: Option<ProgressChannel>,
}

impl ProgressReporter {
    pub fn new(channel: Option<ProgressChannel>) -> Self {
        Self { channel }
    }

    /// 不连接任何观察端
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    /// 推送事件，同时写入 tracing 日志
    pub fn emit(&self, event: ProgressEvent) {
        match event.kind {
            EventKind::Error => error!("{}", event.message),
            EventKind::Warning => warn!("{}", event.message),
            EventKind::Start | EventKind::End | EventKind::Saved => info!("{}", event.message),
            _ => debug!("{}", event.message),
        }

        if let Some(channel) = &self.channel {
            if !channel.write(event) {
                debug!("观察端已断开，事件丢弃 (channel #{})", channel.id());
            }
        }
    }
}
