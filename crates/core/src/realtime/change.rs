//! Change notifications and the records they carry.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::scope::SubscriptionScope;
use crate::ordering::compare_tasks;
use crate::relationships::{FriendRequest, FriendRequestStatus};
use crate::tasks::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// A row-level change: `new` is set for insert/update, `old` for
/// update/delete when the platform knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<T> {
    pub operation: ChangeOperation,
    pub old: Option<T>,
    pub new: Option<T>,
}

impl<T: Record> Change<T> {
    pub fn insert(new: T) -> Self {
        Self {
            operation: ChangeOperation::Insert,
            old: None,
            new: Some(new),
        }
    }

    pub fn update(old: Option<T>, new: T) -> Self {
        Self {
            operation: ChangeOperation::Update,
            old,
            new: Some(new),
        }
    }

    pub fn delete(old: T) -> Self {
        Self {
            operation: ChangeOperation::Delete,
            old: Some(old),
            new: None,
        }
    }

    /// The row the change is about, preferring the newest image.
    pub fn record(&self) -> Option<&T> {
        self.new.as_ref().or(self.old.as_ref())
    }

    /// True when either image of the row belongs to the scope.
    pub fn touches(&self, scope: &SubscriptionScope) -> bool {
        self.old.as_ref().is_some_and(|r| r.in_scope(scope))
            || self.new.as_ref().is_some_and(|r| r.in_scope(scope))
    }

    /// Rewrites the change as seen from one scope. A row leaving the scope
    /// becomes a delete; a change that never touches the scope is dropped.
    pub fn localize(self, scope: &SubscriptionScope) -> Option<Change<T>> {
        let old_in = self.old.as_ref().is_some_and(|r| r.in_scope(scope));
        let new_in = self.new.as_ref().is_some_and(|r| r.in_scope(scope));
        match self.operation {
            ChangeOperation::Insert if new_in => Some(self),
            ChangeOperation::Update if new_in => Some(self),
            ChangeOperation::Update if old_in => self.new.map(Change::delete),
            ChangeOperation::Delete if old_in || new_in => Some(self),
            _ => None,
        }
    }
}

/// A row type that can be reconciled into a scoped list.
pub trait Record: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &str;

    /// Last write time, used for last-write-wins.
    fn updated_at(&self) -> NaiveDateTime;

    fn in_scope(&self, scope: &SubscriptionScope) -> bool;

    /// Order used when rendering a snapshot. Arrival order by default.
    fn display_order(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }

    /// Extracts a change of this row type from the platform's change stream.
    fn from_row_change(change: RowChange) -> Option<Change<Self>>;
}

/// Any change published by the platform after a write commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "change", rename_all = "snake_case")]
pub enum RowChange {
    Tasks(Change<Task>),
    FriendRequests(Change<FriendRequest>),
}

impl Record for Task {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn in_scope(&self, scope: &SubscriptionScope) -> bool {
        match scope {
            SubscriptionScope::PersonalTasks { user_id } => {
                self.is_personal() && &self.user_id == user_id
            }
            SubscriptionScope::BoardTasks { board_id } => {
                self.shared_board_id.as_ref() == Some(board_id)
            }
            SubscriptionScope::IncomingFriendRequests { .. } => false,
        }
    }

    fn display_order(&self, other: &Self) -> Ordering {
        compare_tasks(self, other)
    }

    fn from_row_change(change: RowChange) -> Option<Change<Self>> {
        match change {
            RowChange::Tasks(change) => Some(change),
            _ => None,
        }
    }
}

impl Record for FriendRequest {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn in_scope(&self, scope: &SubscriptionScope) -> bool {
        match scope {
            SubscriptionScope::IncomingFriendRequests { user_id } => {
                &self.receiver_id == user_id && self.status == FriendRequestStatus::Pending
            }
            _ => false,
        }
    }

    /// Newest first.
    fn display_order(&self, other: &Self) -> Ordering {
        other.created_at.cmp(&self.created_at)
    }

    fn from_row_change(change: RowChange) -> Option<Change<Self>> {
        match change {
            RowChange::FriendRequests(change) => Some(change),
            _ => None,
        }
    }
}
