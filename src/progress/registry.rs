//! 会话注册表：会话 ID → 进度通道
//!
//! 由 HTTP 边界层持有，以句柄形式传给编排层。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use super::channel::ProgressChannel;
use crate::models::ProgressEvent;

/// 线程安全、可克隆的会话注册表
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    channels: Arc<DashMap<String, ProgressChannel>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为会话打开新通道；同一会话已有通道时被替换
    pub fn register(
        &self,
        session_id: &str,
    ) -> (ProgressChannel, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (channel, rx) = ProgressChannel::open();
        if self
            .channels
            .insert(session_id.to_string(), channel.clone())
            .is_some()
        {
            debug!("会话 {} 的旧通道已被替换", session_id);
        }
        (channel, rx)
    }

    pub fn get(&self, session_id: &str) -> Option<ProgressChannel> {
        self.channels.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, session_id: &str) -> Option<ProgressChannel> {
        self.channels.remove(session_id).map(|(_, channel)| channel)
    }

    /// 仅当登记的仍是该通道时才移除
    pub fn remove_if_current(&self, session_id: &str, channel_id: u64) -> bool {
        self.channels
            .remove_if(session_id, |_, channel| channel.id() == channel_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;

    #[tokio::test]
    async fn register_get_remove() {
        let registry = SessionRegistry::new();
        let (_channel, mut rx) = registry.register("abc");

        let found = registry.get("abc").unwrap();
        assert!(found.write(ProgressEvent::new(EventKind::Info, "ping", 0)));
        assert_eq!(rx.recv().await.unwrap().message, "ping");

        assert!(registry.remove("abc").is_some());
        assert!(registry.get("abc").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn stale_disconnect_keeps_newer_channel() {
        let registry = SessionRegistry::new();
        let (old, _old_rx) = registry.register("abc");
        let (new, _new_rx) = registry.register("abc");

        assert!(!registry.remove_if_current("abc", old.id()));
        assert_eq!(registry.get("abc").unwrap().id(), new.id());

        assert!(registry.remove_if_current("abc", new.id()));
        assert!(registry.get("abc").is_none());
    }

    #[tokio::test]
    async fn concurrent_registration() {
        let registry = SessionRegistry::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (_channel, rx) = registry.register(&format!("session-{i}"));
                rx
            }));
        }
        let mut receivers = Vec::new();
        for handle in handles {
            receivers.push(handle.await.unwrap());
        }
        assert_eq!(registry.len(), 32);
    }
}
