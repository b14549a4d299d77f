//! Event bus for station notifications
//!
//! Pub/sub over a Tokio broadcast channel. Publishing never fails: with no
//! subscribers the event is simply dropped.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::StationEvent;

/// Default channel capacity for broadcast
pub const DEFAULT_CAPACITY: usize = 256;

/// Largest buffer a station bus will allocate
pub const MAX_CAPACITY: usize = 1 << 16;

/// Shared reference to EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Event bus with broadcast channels
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StationEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an event bus with a custom buffer size, clamped to
    /// `1..=MAX_CAPACITY`
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_CAPACITY));
        Self { sender }
    }

    /// Create a shared reference to this event bus
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers, returning how many received it
    pub fn publish(&self, event: StationEvent) -> usize {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => {
                debug!(event_type, receivers = count, "Event published");
                count
            }
            Err(_) => {
                debug!(event_type, "Event published (no receivers)");
                0
            }
        }
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<StationEvent> {
        self.sender.subscribe()
    }

    pub fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        FilteredReceiver::new(self.subscribe(), filter)
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Filter by handling unit code
    pub hu: Option<String>,
    /// Filter by event types
    pub event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Create a new empty filter (matches all events)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hu(mut self, hu: &str) -> Self {
        self.hu = Some(hu.to_string());
        self
    }

    pub fn types(mut self, event_types: Vec<&str>) -> Self {
        self.event_types = Some(event_types.into_iter().map(String::from).collect());
        self
    }

    /// Check if an event matches this filter.
    ///
    /// An HU filter rejects events that are not scoped to any unit.
    pub fn matches(&self, event: &StationEvent) -> bool {
        if let Some(ref hu) = self.hu {
            if event.hu() != Some(hu.as_str()) {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            if !types.iter().any(|t| t == event.event_type()) {
                return false;
            }
        }

        true
    }
}

/// Filtered event receiver that only yields matching events
pub struct FilteredReceiver {
    receiver: broadcast::Receiver<StationEvent>,
    filter: EventFilter,
}

impl FilteredReceiver {
    pub fn new(receiver: broadcast::Receiver<StationEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event
    pub async fn recv(&mut self) -> Result<StationEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Next matching event already buffered, without waiting
    pub fn try_recv(&mut self) -> Result<StationEvent, broadcast::error::TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scanned(hu: &str, item: &str) -> StationEvent {
        StationEvent::ItemScanned {
            hu: hu.to_string(),
            order_item_id: item.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        assert_eq!(bus.publish(scanned("HU-1", "OI-1")), 1);

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "item_scanned");
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        let bus = EventBus::with_capacity(usize::MAX);
        let _receiver = bus.subscribe();
        assert_eq!(bus.publish(scanned("HU-1", "OI-1")), 1);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert!(!bus.has_subscribers());
        assert_eq!(bus.publish(scanned("HU-1", "OI-1")), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new().shared();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(StationEvent::OrderReset {
            hu: Some("HU-1".to_string()),
            timestamp: Utc::now(),
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.event_type(), e2.event_type());
    }

    #[test]
    fn test_event_filter() {
        let filter = EventFilter::new()
            .hu("HU-1")
            .types(vec!["item_scanned", "imei_verified"]);

        assert!(filter.matches(&scanned("HU-1", "OI-1")));
        assert!(!filter.matches(&scanned("HU-2", "OI-1")));
        assert!(!filter.matches(&StationEvent::BoxSelected {
            hu: "HU-1".to_string(),
            box_id: "BX-1".to_string(),
            timestamp: Utc::now(),
        }));
        assert!(!filter.matches(&StationEvent::LoggedOut {
            username: "u".to_string(),
            timestamp: Utc::now(),
        }));
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let bus = EventBus::new();
        let mut filtered = bus.subscribe_filtered(EventFilter::new().hu("target"));

        let publisher = bus.clone();
        tokio::spawn(async move {
            publisher.publish(scanned("other", "OI-1"));
            publisher.publish(scanned("target", "OI-2"));
        });

        let event = filtered.recv().await.unwrap();
        assert_eq!(event.hu(), Some("target"));
    }

    #[test]
    fn test_filtered_try_recv_skips_non_matching() {
        let bus = EventBus::with_capacity(8);
        let mut filtered = bus.subscribe_filtered(EventFilter::new().types(vec!["item_scanned"]));

        bus.publish(StationEvent::OrderReset {
            hu: None,
            timestamp: Utc::now(),
        });
        bus.publish(scanned("HU-1", "OI-1"));

        assert_eq!(filtered.try_recv().unwrap().event_type(), "item_scanned");
        assert!(filtered.try_recv().is_err());
    }
}
