//! Realtime module - change feeds, subscription state and reconciliation.
//!
//! A subscription follows one [`SubscriptionScope`]. Its changes are folded
//! into a [`ScopedList`] keyed by row id with last-write-wins on
//! `updated_at`, and deletes leave tombstones until the next resync.

mod change;
mod feed;
mod listener;
mod reconciler;
mod scope;
mod scoped_list;
mod status;

pub use change::{Change, ChangeOperation, Record, RowChange};
pub use feed::{
    ChangeFeed, ChangeHub, ChangeSink, FeedError, FeedItem, FeedStream, NoOpChangeSink,
};
pub use listener::LiveScope;
pub use reconciler::{Reconciler, ScopeSnapshot, ScopeState};
pub use scope::SubscriptionScope;
pub use scoped_list::{ApplyOutcome, IgnoreReason, ScopedList, DEFAULT_TOMBSTONE_LIMIT};
pub use status::{StatusSignal, SubscriptionStatus};
