//! Best-effort notification fan-out.
//!
//! Lifecycle announcements are side effects of an operation that already
//! succeeded: a delivery failure is logged and dropped, never surfaced to
//! the operation that triggered it.

use std::sync::Arc;

use cyberclub_core::config::BroadcastConfig;
use cyberclub_core::traits::Channel;

/// What happened, which picks the destination channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    EventAdded,
    EventPruned,
    DailyFact,
}

pub struct Notifier {
    channel: Arc<dyn Channel>,
    broadcast: BroadcastConfig,
}

impl Notifier {
    pub fn new(channel: Arc<dyn Channel>, broadcast: BroadcastConfig) -> Self {
        Self { channel, broadcast }
    }

    fn destination(&self, kind: NotifyKind) -> &str {
        match kind {
            NotifyKind::EventAdded | NotifyKind::EventPruned => &self.broadcast.events_channel_id,
            NotifyKind::DailyFact => &self.broadcast.facts_channel_id,
        }
    }

    /// Deliver a notification, best-effort. Unresolvable destinations and
    /// send failures are logged and swallowed.
    pub async fn notify(&self, kind: NotifyKind, message: &str) {
        let destination = self.destination(kind);
        if destination.is_empty() {
            tracing::warn!("No destination configured for {kind:?}, dropping notification");
            return;
        }
        if let Err(e) = self.channel.send(destination, message).await {
            tracing::warn!(
                "Notification {kind:?} to {} via {} failed: {e}",
                destination,
                self.channel.name()
            );
        }
    }

    /// Fire-and-forget variant: dispatch after the primary operation's
    /// outcome is already final, without delaying its reply.
    pub fn dispatch(self: &Arc<Self>, kind: NotifyKind, message: String) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            notifier.notify(kind, &message).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cyberclub_core::error::{ClubError, Result};
    use std::sync::Mutex;

    pub struct RecordingChannel {
        pub sent: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    impl RecordingChannel {
        pub fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self { sent: Mutex::new(Vec::new()), fail })
        }
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, channel_id: &str, content: &str) -> Result<()> {
            if self.fail {
                return Err(ClubError::channel("simulated outage"));
            }
            self.sent
                .lock()
                .expect("sent lock")
                .push((channel_id.to_string(), content.to_string()));
            Ok(())
        }
    }

    fn broadcast() -> BroadcastConfig {
        BroadcastConfig {
            events_channel_id: "events-chan".into(),
            facts_channel_id: "facts-chan".into(),
        }
    }

    #[tokio::test]
    async fn test_kind_routes_to_destination() {
        let channel = RecordingChannel::new(false);
        let notifier = Notifier::new(channel.clone(), broadcast());

        notifier.notify(NotifyKind::EventPruned, "gone").await;
        notifier.notify(NotifyKind::DailyFact, "fact").await;

        let sent = channel.sent.lock().expect("lock");
        assert_eq!(sent[0].0, "events-chan");
        assert_eq!(sent[1].0, "facts-chan");
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let channel = RecordingChannel::new(true);
        let notifier = Notifier::new(channel, broadcast());
        // Must not panic or propagate.
        notifier.notify(NotifyKind::EventAdded, "new event").await;
    }

    #[tokio::test]
    async fn test_missing_destination_drops() {
        let channel = RecordingChannel::new(false);
        let notifier = Notifier::new(channel.clone(), BroadcastConfig::default());
        notifier.notify(NotifyKind::DailyFact, "fact").await;
        assert!(channel.sent.lock().expect("lock").is_empty());
    }
}
