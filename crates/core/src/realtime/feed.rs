//! Change-feed port and the in-process broadcast hub implementing it.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

use super::change::{Change, Record, RowChange};
use super::scope::SubscriptionScope;
use crate::errors::Result;

/// Transport-level failure observed on a feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The subscriber fell behind and `0` changes were dropped; resync.
    #[error("subscriber lagged behind by {0} changes")]
    Lagged(u64),

    #[error("change feed closed")]
    Closed,
}

pub type FeedItem<T> = std::result::Result<Change<T>, FeedError>;

/// Changes for one scope. Dropping the stream unsubscribes.
pub type FeedStream<T> = BoxStream<'static, FeedItem<T>>;

/// The platform's change-feed interface.
#[async_trait]
pub trait ChangeFeed<T: Record>: Send + Sync {
    async fn subscribe(&self, scope: &SubscriptionScope) -> Result<FeedStream<T>>;
}

/// Receives changes after the write that produced them commits.
///
/// `publish()` must not block and must not fail the write.
pub trait ChangeSink: Send + Sync {
    fn publish(&self, change: RowChange);

    fn publish_batch(&self, changes: Vec<RowChange>) {
        for change in changes {
            self.publish(change);
        }
    }
}

/// Discards every change.
#[derive(Clone, Default)]
pub struct NoOpChangeSink;

impl ChangeSink for NoOpChangeSink {
    fn publish(&self, _change: RowChange) {}
}

/// Fan-out of committed changes to every live subscription.
#[derive(Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<RowChange>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream of the changes touching `scope`, starting now.
    pub fn stream<T: Record>(&self, scope: &SubscriptionScope) -> FeedStream<T> {
        let receiver = self.sender.subscribe();
        debug!("Subscribed to {}", scope);
        Box::pin(stream::unfold(
            (receiver, scope.clone()),
            |(mut receiver, scope)| async move {
                loop {
                    match receiver.recv().await {
                        Ok(row_change) => {
                            let Some(change) = T::from_row_change(row_change) else {
                                continue;
                            };
                            if change.touches(&scope) {
                                return Some((Ok(change), (receiver, scope)));
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!("Subscription {} lagged by {} changes", scope, missed);
                            return Some((Err(FeedError::Lagged(missed)), (receiver, scope)));
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            },
        ))
    }
}

impl ChangeSink for ChangeHub {
    fn publish(&self, change: RowChange) {
        // Sending only fails when nobody is listening.
        if self.sender.send(change).is_err() {
            debug!("Change dropped, no subscribers");
        }
    }
}

#[async_trait]
impl<T: Record> ChangeFeed<T> for ChangeHub {
    async fn subscribe(&self, scope: &SubscriptionScope) -> Result<FeedStream<T>> {
        Ok(self.stream(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::{FriendRequest, FriendRequestStatus};
    use crate::tasks::{Priority, Task};
    use chrono::Utc;
    use futures::StreamExt;

    fn task(id: &str, owner: &str) -> Task {
        let now = Utc::now().naive_utc();
        Task {
            id: id.to_string(),
            user_id: owner.to_string(),
            shared_board_id: None,
            title: id.to_string(),
            description: None,
            priority: Priority::Low,
            completed: false,
            completed_at: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_stream_filters_by_scope_and_table() {
        let hub = ChangeHub::new(16);
        let mut alice = hub.stream::<Task>(&SubscriptionScope::personal("alice"));

        let now = Utc::now().naive_utc();
        hub.publish(RowChange::FriendRequests(Change::insert(FriendRequest {
            id: "req".into(),
            sender_id: "bob".into(),
            receiver_id: "alice".into(),
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })));
        hub.publish(RowChange::Tasks(Change::insert(task("bobs", "bob"))));
        hub.publish(RowChange::Tasks(Change::insert(task("alices", "alice"))));

        let first = alice.next().await.unwrap().unwrap();
        assert_eq!(first.record().unwrap().id, "alices");
    }

    #[tokio::test]
    async fn test_slow_subscriber_sees_lag() {
        let hub = ChangeHub::new(2);
        let mut stream = hub.stream::<Task>(&SubscriptionScope::personal("alice"));
        for i in 0..5 {
            hub.publish(RowChange::Tasks(Change::insert(task(&format!("t{}", i), "alice"))));
        }
        assert_eq!(stream.next().await.unwrap(), Err(FeedError::Lagged(3)));
        let next = stream.next().await.unwrap().unwrap();
        assert_eq!(next.record().unwrap().id, "t3");
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let hub = ChangeHub::new(4);
        let stream = hub.stream::<Task>(&SubscriptionScope::personal("alice"));
        assert_eq!(hub.subscriber_count(), 1);
        drop(stream);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
