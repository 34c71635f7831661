//! Push-notification subscriptions kept by a client.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server push channel the client has registered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// Resource or topic the notifications are about.
    pub topic_id: String,
    /// Opaque token echoed back by the server with every notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

impl Subscription {
    /// New subscription with a random id.
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.into(),
            client_token: None,
        }
    }

    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = Some(token.into());
        self
    }
}

/// Storage for active subscriptions, keyed by id.
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace.
    fn store(&self, subscription: Subscription);

    fn get(&self, id: &str) -> Option<Subscription>;

    fn remove(&self, id: &str) -> Option<Subscription>;

    fn list(&self) -> Vec<Subscription>;
}

#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn store(&self, subscription: Subscription) {
        tracing::debug!(id = %subscription.id, topic = %subscription.topic_id, "storing subscription");
        self.subscriptions
            .write()
            .insert(subscription.id.clone(), subscription);
    }

    fn get(&self, id: &str) -> Option<Subscription> {
        self.subscriptions.read().get(id).cloned()
    }

    fn remove(&self, id: &str) -> Option<Subscription> {
        self.subscriptions.write().remove(id)
    }

    fn list(&self) -> Vec<Subscription> {
        let mut all: Vec<_> = self.subscriptions.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_get_remove() {
        let store = MemorySubscriptionStore::new();
        let sub = Subscription::new("todos").with_client_token("tok");
        store.store(sub.clone());

        assert_eq!(store.get(&sub.id), Some(sub.clone()));
        assert_eq!(store.remove(&sub.id), Some(sub.clone()));
        assert!(store.get(&sub.id).is_none());
        assert!(store.remove(&sub.id).is_none());
    }

    #[test]
    fn store_replaces_same_id() {
        let store = MemorySubscriptionStore::new();
        let sub = Subscription::new("a");
        store.store(sub.clone());
        store.store(Subscription {
            topic_id: "b".to_string(),
            ..sub.clone()
        });
        let all = store.list();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].topic_id, "b");
    }

    #[test]
    fn new_subscriptions_get_distinct_ids() {
        assert_ne!(Subscription::new("t").id, Subscription::new("t").id);
    }

    #[test]
    fn client_token_is_omitted_when_absent() {
        let sub = Subscription {
            id: "1".to_string(),
            topic_id: "t".to_string(),
            client_token: None,
        };
        let json = serde_json::to_value(&sub).unwrap();
        assert!(json.get("client_token").is_none());
        assert_eq!(json["topic_id"], "t");
    }
}
