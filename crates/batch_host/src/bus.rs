use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use batch_logging::batch_trace;
use serde_json::Value;

use crate::{EventBus, EventHandler, SubscriptionId};

/// In-process named-channel broadcast.
///
/// Events published on a channel without subscribers are dropped.
#[derive(Default)]
pub struct BroadcastBus {
    channels: Mutex<HashMap<String, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `detail` to every current subscriber of `channel`.
    pub fn publish(&self, channel: &str, detail: &Value) {
        // Handlers run outside the lock so they may touch the bus themselves.
        let handlers: Vec<EventHandler> = {
            let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
            channels
                .get(channel)
                .map(|subs| subs.iter().map(|(_, handler)| handler.clone()).collect())
                .unwrap_or_default()
        };
        batch_trace!("Publishing on {} to {} subscribers", channel, handlers.len());
        for handler in handlers {
            handler(detail);
        }
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .map_or(0, Vec::len)
    }
}

impl EventBus for BroadcastBus {
    fn subscribe(&self, channel: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(channel.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn unsubscribe(&self, channel: &str, id: SubscriptionId) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subs) = channels.get_mut(channel) {
            subs.retain(|(sub_id, _)| *sub_id != id);
            if subs.is_empty() {
                channels.remove(channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[test]
    fn delivers_only_to_current_subscribers_of_the_channel() {
        let bus = BroadcastBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = bus.subscribe(
            "stash:response",
            Arc::new(move |detail: &Value| sink.lock().unwrap().push(detail.clone())),
        );

        bus.publish("stash:response", &json!({ "n": 1 }));
        bus.publish("other", &json!({ "n": 2 }));
        bus.unsubscribe("stash:response", id);
        bus.publish("stash:response", &json!({ "n": 3 }));

        assert_eq!(*seen.lock().unwrap(), vec![json!({ "n": 1 })]);
        assert_eq!(bus.subscriber_count("stash:response"), 0);
    }
}
