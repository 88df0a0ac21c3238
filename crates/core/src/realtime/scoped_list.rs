use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::change::{Change, ChangeOperation, Record};

/// What applying one change did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Inserted,
    Replaced,
    Removed,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Insert for an id already held
    Duplicate,
    /// Older than the held copy
    Stale,
    /// Not newer than the delete that removed the id
    Deleted,
    /// Delete for an id not held
    Absent,
    /// The change carried no row image
    Empty,
    /// The row does not belong to this scope
    OutOfScope,
}

/// Tombstones kept between resyncs before the oldest delete is forgotten.
pub const DEFAULT_TOMBSTONE_LIMIT: usize = 1024;

/// Client-held copy of one scope's rows, keyed by id, last write wins.
#[derive(Debug, Clone)]
pub struct ScopedList<T> {
    items: Vec<T>,
    tombstones: HashMap<String, NaiveDateTime>,
    tombstone_limit: usize,
}

impl<T> Default for ScopedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            tombstones: HashMap::new(),
            tombstone_limit: DEFAULT_TOMBSTONE_LIMIT,
        }
    }
}

impl<T: Record> ScopedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds at most `limit` tombstones; at least one is always kept.
    pub fn with_tombstone_limit(limit: usize) -> Self {
        Self {
            tombstone_limit: limit.max(1),
            ..Self::default()
        }
    }

    pub fn from_rows(rows: Vec<T>) -> Self {
        let mut list = Self::new();
        list.resync(rows);
        list
    }

    pub fn apply(&mut self, change: Change<T>) -> ApplyOutcome {
        match change.operation {
            ChangeOperation::Insert => match change.new {
                Some(row) => self.upsert(row, false),
                None => ApplyOutcome::Ignored(IgnoreReason::Empty),
            },
            ChangeOperation::Update => match change.new {
                Some(row) => self.upsert(row, true),
                None => ApplyOutcome::Ignored(IgnoreReason::Empty),
            },
            ChangeOperation::Delete => match change.old.or(change.new) {
                Some(row) => self.remove(&row),
                None => ApplyOutcome::Ignored(IgnoreReason::Empty),
            },
        }
    }

    /// Replaces the contents with a fresh fetch and forgets all deletes.
    pub fn resync(&mut self, rows: Vec<T>) {
        self.tombstones.clear();
        self.items.clear();
        for row in rows {
            match self.position(row.record_id()) {
                Some(index) => self.items[index] = row,
                None => self.items.push(row),
            }
        }
    }

    /// Rows in arrival order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Rows in the record type's display order.
    pub fn ordered(&self) -> Vec<T> {
        let mut rows = self.items.clone();
        rows.sort_by(|a, b| a.display_order(b));
        rows
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|r| r.record_id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deletes still remembered for echo suppression.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|r| r.record_id() == id)
    }

    fn upsert(&mut self, row: T, replace: bool) -> ApplyOutcome {
        if let Some(deleted_at) = self.tombstones.get(row.record_id()) {
            if row.updated_at() <= *deleted_at {
                return ApplyOutcome::Ignored(IgnoreReason::Deleted);
            }
            self.tombstones.remove(row.record_id());
        }

        match self.position(row.record_id()) {
            Some(_) if !replace => ApplyOutcome::Ignored(IgnoreReason::Duplicate),
            Some(index) if row.updated_at() < self.items[index].updated_at() => {
                ApplyOutcome::Ignored(IgnoreReason::Stale)
            }
            Some(index) => {
                self.items[index] = row;
                ApplyOutcome::Replaced
            }
            None => {
                self.items.push(row);
                ApplyOutcome::Inserted
            }
        }
    }

    fn remove(&mut self, row: &T) -> ApplyOutcome {
        let deleted_at = self
            .tombstones
            .get(row.record_id())
            .map_or(row.updated_at(), |at| (*at).max(row.updated_at()));
        self.tombstones
            .insert(row.record_id().to_string(), deleted_at);
        self.prune_tombstones(row.record_id());

        match self.position(row.record_id()) {
            Some(index) => {
                self.items.remove(index);
                ApplyOutcome::Removed
            }
            None => ApplyOutcome::Ignored(IgnoreReason::Absent),
        }
    }

    /// Drops the oldest tombstones over the limit, never the one just written.
    fn prune_tombstones(&mut self, keep: &str) {
        while self.tombstones.len() > self.tombstone_limit {
            let oldest = self
                .tombstones
                .iter()
                .filter(|(id, _)| id.as_str() != keep)
                .min_by(|(a_id, a_at), (b_id, b_at)| a_at.cmp(b_at).then_with(|| a_id.cmp(b_id)))
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    self.tombstones.remove(&id);
                }
                None => break,
            }
        }
    }
}
