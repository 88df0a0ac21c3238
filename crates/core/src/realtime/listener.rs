use std::sync::Arc;

use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::change::Record;
use super::feed::{ChangeFeed, FeedError, FeedItem, FeedStream};
use super::reconciler::{Reconciler, ScopeSnapshot};
use super::scope::SubscriptionScope;
use super::status::SubscriptionStatus;
use crate::errors::{Error, Result};

enum Command<T> {
    Resync(Vec<T>),
    Close,
}

/// A running subscription that folds its feed into a reconciled list.
///
/// Each listener owns its own [`Reconciler`] entry on a dedicated task and
/// publishes a fresh [`ScopeSnapshot`] after every change.
pub struct LiveScope<T: Record> {
    scope: SubscriptionScope,
    snapshots: watch::Receiver<ScopeSnapshot<T>>,
    commands: mpsc::UnboundedSender<Command<T>>,
    task: JoinHandle<()>,
}

impl<T: Record> LiveScope<T> {
    /// Seeds the list with `initial` and subscribes to `feed` for `scope`.
    pub fn spawn(feed: Arc<dyn ChangeFeed<T>>, scope: SubscriptionScope, initial: Vec<T>) -> Self {
        let (snapshot_tx, snapshots) = watch::channel(ScopeSnapshot {
            scope: scope.clone(),
            status: SubscriptionStatus::Connecting,
            items: Vec::new(),
        });
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(feed, scope.clone(), initial, snapshot_tx, command_rx));
        Self {
            scope,
            snapshots,
            commands,
            task,
        }
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    pub fn snapshot(&self) -> ScopeSnapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn watch(&self) -> watch::Receiver<ScopeSnapshot<T>> {
        self.snapshots.clone()
    }

    /// Replaces the held rows with a fresh fetch.
    pub fn resync(&self, rows: Vec<T>) -> Result<()> {
        self.commands
            .send(Command::Resync(rows))
            .map_err(|_| Error::Realtime(format!("listener for {} has stopped", self.scope)))
    }

    /// Tears the subscription down and returns the final snapshot.
    pub async fn close(self) -> Result<ScopeSnapshot<T>> {
        // The task may already be gone; the join below still settles it.
        let _ = self.commands.send(Command::Close);
        self.task
            .await
            .map_err(|e| Error::Realtime(format!("listener for {} failed: {}", self.scope, e)))?;
        let snapshot = self.snapshots.borrow().clone();
        Ok(snapshot)
    }
}

async fn next_change<T: Record>(stream: &mut Option<FeedStream<T>>) -> Option<FeedItem<T>> {
    match stream.as_mut() {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn run<T: Record>(
    feed: Arc<dyn ChangeFeed<T>>,
    scope: SubscriptionScope,
    initial: Vec<T>,
    snapshots: watch::Sender<ScopeSnapshot<T>>,
    mut commands: mpsc::UnboundedReceiver<Command<T>>,
) {
    let mut reconciler = Reconciler::new();
    reconciler.open(scope.clone());
    let publish = |reconciler: &Reconciler<T>| {
        if let Some(snapshot) = reconciler.snapshot(&scope) {
            snapshots.send_replace(snapshot);
        }
    };

    if let Err(e) = reconciler.resync(&scope, initial) {
        warn!("Initial load for {} failed: {}", scope, e);
    }
    let mut stream = match feed.subscribe(&scope).await {
        Ok(stream) => {
            let _ = reconciler.acknowledge(&scope);
            Some(stream)
        }
        Err(e) => {
            warn!("Subscribing to {} failed: {}", scope, e);
            let _ = reconciler.report_error(&scope, e.to_string());
            None
        }
    };
    publish(&reconciler);

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::Resync(rows)) => {
                    let _ = reconciler.resync(&scope, rows);
                    let recovering = matches!(
                        reconciler.status(&scope),
                        Some(SubscriptionStatus::Error(_))
                    );
                    if recovering && stream.is_some() {
                        let _ = reconciler.acknowledge(&scope);
                    }
                }
                Some(Command::Close) | None => break,
            },
            item = next_change(&mut stream) => match item {
                Some(Ok(change)) => match reconciler.apply(&scope, change) {
                    Ok(outcome) => debug!("{}: {:?}", scope, outcome),
                    Err(e) => warn!("Dropping change for {}: {}", scope, e),
                },
                Some(Err(e)) => {
                    let _ = reconciler.report_error(&scope, e.to_string());
                }
                None => {
                    let _ = reconciler.report_error(&scope, FeedError::Closed.to_string());
                    stream = None;
                }
            },
        }
        publish(&reconciler);
    }

    drop(stream);
    let _ = reconciler.close(&scope);
    publish(&reconciler);
    debug!("Listener for {} closed", scope);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{Change, ChangeHub, ChangeSink, RowChange};
    use crate::tasks::{Priority, Task};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    fn at(seconds: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::seconds(seconds)
    }

    fn task(id: &str, sort_order: i64, updated: i64) -> Task {
        Task {
            id: id.to_string(),
            user_id: "alice".to_string(),
            shared_board_id: None,
            title: id.to_string(),
            description: None,
            priority: Priority::Medium,
            completed: false,
            completed_at: None,
            sort_order,
            created_at: at(0),
            updated_at: at(updated),
        }
    }

    async fn wait_for<T, F>(rx: &mut watch::Receiver<ScopeSnapshot<T>>, mut done: F)
    where
        T: Record,
        F: FnMut(&ScopeSnapshot<T>) -> bool,
    {
        timeout(StdDuration::from_secs(2), rx.wait_for(|s| done(s)))
            .await
            .expect("timed out waiting for snapshot")
            .expect("listener dropped");
    }

    #[tokio::test]
    async fn test_listener_folds_feed_into_snapshot() {
        let hub = ChangeHub::new(16);
        let scope = SubscriptionScope::personal("alice");
        let live = LiveScope::spawn(
            Arc::new(hub.clone()) as Arc<dyn ChangeFeed<Task>>,
            scope,
            vec![task("t1", 0, 0)],
        );
        let mut rx = live.watch();
        wait_for(&mut rx, |s| s.status == SubscriptionStatus::Subscribed).await;

        hub.publish(RowChange::Tasks(Change::insert(task("t2", 1, 1))));
        hub.publish(RowChange::Tasks(Change::update(None, task("t2", -1, 2))));
        hub.publish(RowChange::Tasks(Change::insert(task("t2", 1, 1))));

        wait_for(&mut rx, |s| {
            s.items.len() == 2 && s.items[0].id == "t2" && s.items[0].sort_order == -1
        })
        .await;

        hub.publish(RowChange::Tasks(Change::delete(task("t1", 0, 3))));
        wait_for(&mut rx, |s| s.items.len() == 1).await;

        let last = live.close().await.unwrap();
        assert_eq!(last.status, SubscriptionStatus::Closed);
        assert_eq!(last.items[0].id, "t2");
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lag_reports_error_and_resync_recovers() {
        let hub = ChangeHub::new(1);
        let scope = SubscriptionScope::personal("alice");
        let live = LiveScope::spawn(
            Arc::new(hub.clone()) as Arc<dyn ChangeFeed<Task>>,
            scope,
            Vec::new(),
        );
        let mut rx = live.watch();
        wait_for(&mut rx, |s| s.status == SubscriptionStatus::Subscribed).await;

        // Nothing yields between sends, so the burst overflows the channel.
        for i in 0..8 {
            hub.publish(RowChange::Tasks(Change::insert(task(&format!("t{}", i), i, i))));
        }
        wait_for(&mut rx, |s| matches!(s.status, SubscriptionStatus::Error(_))).await;

        live.resync(vec![task("fresh", 0, 100)]).unwrap();
        wait_for(&mut rx, |s| {
            s.status == SubscriptionStatus::Subscribed
                && s.items.iter().any(|t| t.id == "fresh")
        })
        .await;

        live.close().await.unwrap();
    }
}
