//! Change notification and trace logging

use tokio::sync::broadcast;
use tracing::{info, trace};

use crate::model::{ConfigDataChangeEvent, ConfigTraceEvent};

/// Tracing target carrying persistence trace records
pub const CONFIG_TRACE_TARGET: &str = "config_trace";

/// Receives change and trace events after a successful write
///
/// Failures are logged by the caller and never undo the write.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: ConfigDataChangeEvent) -> anyhow::Result<()>;

    fn trace(&self, event: ConfigTraceEvent) -> anyhow::Result<()>;
}

/// Broadcasts change events to in-process subscribers and writes trace records
/// to the `config_trace` target
#[derive(Clone)]
pub struct ChangePublisher {
    sender: broadcast::Sender<ConfigDataChangeEvent>,
}

impl Default for ChangePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePublisher {
    /// Default channel capacity for change events
    const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigDataChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for ChangePublisher {
    fn notify(&self, event: ConfigDataChangeEvent) -> anyhow::Result<()> {
        // Sending only fails when nobody listens
        if self.sender.send(event).is_err() {
            trace!("No subscriber for config change event");
        }
        Ok(())
    }

    fn trace(&self, event: ConfigTraceEvent) -> anyhow::Result<()> {
        info!(
            target: CONFIG_TRACE_TARGET,
            data_id = %event.data_id,
            group = %event.group,
            tenant = %event.namespace,
            request_ip_app = event.request_ip_app.as_deref().unwrap_or(""),
            timestamp = event.timestamp,
            handle_ip = %event.handle_ip,
            event_type = %event.event_type,
            persistence_type = %event.persistence_type,
            content_len = event.content.as_ref().map(|c| c.len()).unwrap_or(0),
            "config persistence trace"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PERSISTENCE_EVENT, PERSISTENCE_TYPE_PUB};

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = ChangePublisher::new();
        let mut rx = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);

        publisher
            .notify(ConfigDataChangeEvent::new("a.yaml", "G", "dev", 1))
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.data_id, "a.yaml");
        assert!(!event.is_beta);
    }

    #[test]
    fn test_notify_without_subscribers_is_ok() {
        let publisher = ChangePublisher::with_capacity(4);
        assert!(publisher
            .notify(ConfigDataChangeEvent::new("a.yaml", "G", "", 1))
            .is_ok());
        assert!(publisher
            .trace(ConfigTraceEvent {
                data_id: "a.yaml".to_string(),
                group: "G".to_string(),
                namespace: String::new(),
                request_ip_app: None,
                timestamp: 1,
                handle_ip: "127.0.0.1".to_string(),
                event_type: PERSISTENCE_EVENT.to_string(),
                persistence_type: PERSISTENCE_TYPE_PUB.to_string(),
                content: Some("k=v".to_string()),
            })
            .is_ok());
    }
}
