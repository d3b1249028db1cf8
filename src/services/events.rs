//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Admin mutations publish [`SiteEvent`]s here; the public event stream and
//! any other listener subscribe independently.

use crate::models::SettingKey;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Category,
    Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SiteEvent {
    /// A global setting was written; listeners should re-fetch settings.
    SettingsChanged { key: SettingKey },
    /// A category or item was saved or deleted.
    ContentChanged {
        kind: ContentKind,
        id: String,
        deleted: bool,
    },
    /// An admin signed in or out.
    SessionChanged { email: String, signed_in: bool },
}

impl SiteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SiteEvent::SettingsChanged { .. } => "settings_changed",
            SiteEvent::ContentChanged { .. } => "content_changed",
            SiteEvent::SessionChanged { .. } => "session_changed",
        }
    }

    /// Session events stay server-side.
    pub fn is_public(&self) -> bool {
        !matches!(self, SiteEvent::SessionChanged { .. })
    }
}

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus: every subscriber receives every event published after it
/// subscribed. Slow receivers observe `RecvError::Lagged` and skip ahead.
pub struct EventBus {
    sender: broadcast::Sender<SiteEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: SiteEvent) {
        tracing::debug!("📣 Event: {}", event.name());
        // An error only means nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_settings_changes() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(SiteEvent::SettingsChanged {
            key: SettingKey::BackgroundMusic,
        });

        let expected = SiteEvent::SettingsChanged {
            key: SettingKey::BackgroundMusic,
        };
        assert_eq!(rx1.recv().await.unwrap(), expected);
        assert_eq!(rx2.recv().await.unwrap(), expected);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(SiteEvent::SessionChanged {
            email: "a@b.c".into(),
            signed_in: false,
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(SiteEvent::SettingsChanged {
            key: SettingKey::HeroImage,
        })
        .unwrap();
        assert_eq!(json["type"], "settings_changed");
        assert_eq!(json["key"], "hero_image");
        assert!(
            !SiteEvent::SessionChanged {
                email: String::new(),
                signed_in: true
            }
            .is_public()
        );
    }
}
