// src/server/notifier.rs

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Push message sent to every connected preview client.
///
/// Serialized as `{"type":"stream","paths":[...]}` or `{"type":"reload"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Changed files, relative to the output root. Clients hot-swap matching
    /// stylesheets and reload for anything else.
    Stream { paths: Vec<String> },
    Reload,
}

const CHANNEL_CAPACITY: usize = 64;

/// Process-wide live-reload broadcaster.
///
/// Delivery is best effort: with no clients connected, messages are simply
/// dropped, and a client that lags behind loses the oldest messages.
#[derive(Debug, Clone)]
pub struct LiveReload {
    tx: broadcast::Sender<ReloadMessage>,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Push changed assets. Source maps are never streamed. Returns the
    /// number of clients the message reached.
    pub fn stream<I, S>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.ends_with(".map"))
            .collect();
        if paths.is_empty() {
            return 0;
        }
        debug!(?paths, "live-reload stream");
        self.send(ReloadMessage::Stream { paths })
    }

    pub fn reload(&self) -> usize {
        debug!("live-reload full reload");
        self.send(ReloadMessage::Reload)
    }

    fn send(&self, msg: ReloadMessage) -> usize {
        self.tx.send(msg).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_type_tag() {
        let msg = ReloadMessage::Stream {
            paths: vec!["css/main.css".into()],
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"stream","paths":["css/main.css"]}"#
        );
        assert_eq!(
            serde_json::to_string(&ReloadMessage::Reload).unwrap(),
            r#"{"type":"reload"}"#
        );
    }

    #[tokio::test]
    async fn stream_filters_source_maps() {
        let notifier = LiveReload::new();
        let mut rx = notifier.subscribe();

        assert_eq!(notifier.stream(["css/main.css.map"]), 0);
        assert_eq!(notifier.stream(["css/main.css", "css/main.css.map"]), 1);

        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg,
            ReloadMessage::Stream {
                paths: vec!["css/main.css".into()]
            }
        );
    }

    #[test]
    fn sending_without_clients_is_fine() {
        let notifier = LiveReload::new();
        assert_eq!(notifier.reload(), 0);
        assert_eq!(notifier.client_count(), 0);
    }
}
