//! Owner-keyed change feed backing the live todo list.
//!
//! Each owner has its own broadcast channel. A subscriber only learns that
//! something changed; it re-reads the list through
//! [`TodoService::list`](crate::service::TodoService::list), so a lagging
//! receiver that misses notifications still converges on the latest state.
//!
//! ```text
//! TodoService ── publish(owner, change) ──> channel[owner] ──> live list sockets
//! ```

use crate::types::{TodoId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Default per-owner channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// A committed change to one of an owner's todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TodoChange {
    /// A todo was created
    Created {
        /// Todo identifier
        id: TodoId,
    },
    /// A todo's completion flag flipped
    Toggled {
        /// Todo identifier
        id: TodoId,
        /// Completion flag after the toggle
        completed: bool,
    },
    /// A todo's content fields were updated
    Updated {
        /// Todo identifier
        id: TodoId,
    },
    /// A todo was deleted
    Removed {
        /// Todo identifier
        id: TodoId,
    },
}

impl TodoChange {
    /// The todo this change refers to.
    #[must_use]
    pub const fn todo_id(&self) -> TodoId {
        match self {
            Self::Created { id }
            | Self::Toggled { id, .. }
            | Self::Updated { id }
            | Self::Removed { id } => *id,
        }
    }
}

type Channels = Arc<RwLock<HashMap<UserId, broadcast::Sender<TodoChange>>>>;

/// Publish/subscribe channel keyed by owner.
///
/// Cloning shares the channel map.
#[derive(Clone)]
pub struct ChangeFeed {
    channels: Channels,
    capacity: usize,
}

impl ChangeFeed {
    /// Create a feed with the default per-owner capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a feed with a custom per-owner capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Publish a change to everyone watching `owner`'s list.
    ///
    /// Returns the number of subscribers notified. Channels without
    /// subscribers are dropped.
    pub async fn publish(&self, owner: UserId, change: TodoChange) -> usize {
        let mut channels = self.channels.write().await;

        let Some(sender) = channels.get(&owner) else {
            return 0;
        };

        if let Ok(count) = sender.send(change) {
            count
        } else {
            channels.remove(&owner);
            0
        }
    }

    /// Subscribe to changes of `owner`'s todos.
    ///
    /// Channels whose subscribers have all gone are dropped first.
    pub async fn subscribe(&self, owner: UserId) -> broadcast::Receiver<TodoChange> {
        let mut channels = self.channels.write().await;
        prune(&mut channels);

        channels
            .entry(owner)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of owners with at least one live subscriber.
    pub async fn owner_count(&self) -> usize {
        let mut channels = self.channels.write().await;
        prune(&mut channels);
        channels.len()
    }
}

fn prune(channels: &mut HashMap<UserId, broadcast::Sender<TodoChange>>) {
    channels.retain(|_, sender| sender.receiver_count() > 0);
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn subscriber_receives_only_its_owner() {
        let feed = ChangeFeed::new();
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());
        let mut rx = feed.subscribe(alice).await;

        let id = TodoId::new();
        assert_eq!(feed.publish(bob, TodoChange::Created { id: TodoId::new() }).await, 0);
        assert_eq!(feed.publish(alice, TodoChange::Created { id }).await, 1);

        assert_eq!(rx.recv().await.unwrap(), TodoChange::Created { id });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn channel_is_dropped_once_subscribers_leave() {
        let feed = ChangeFeed::new();
        let owner = UserId(Uuid::new_v4());

        let rx = feed.subscribe(owner).await;
        assert_eq!(feed.owner_count().await, 1);
        drop(rx);

        let delivered = feed
            .publish(owner, TodoChange::Removed { id: TodoId::new() })
            .await;

        assert_eq!(delivered, 0);
        assert_eq!(feed.owner_count().await, 0);
    }

    #[tokio::test]
    async fn abandoned_channels_are_pruned_without_a_publish() {
        let feed = ChangeFeed::new();
        let gone = UserId(Uuid::new_v4());
        let staying = UserId(Uuid::new_v4());

        drop(feed.subscribe(gone).await);
        let _rx = feed.subscribe(staying).await;

        assert_eq!(feed.owner_count().await, 1);
        assert_eq!(
            feed.publish(staying, TodoChange::Created { id: TodoId::new() }).await,
            1
        );
    }

    #[test]
    fn change_serializes_with_type_tag() {
        let id = TodoId::new();
        let json = serde_json::to_value(TodoChange::Toggled { id, completed: true }).unwrap();
        assert_eq!(json["type"], "toggled");
        assert_eq!(json["completed"], true);
        assert_eq!(json["id"], id.to_string());
    }
}
