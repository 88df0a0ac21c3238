use std::collections::HashMap;

use serde::Serialize;

use super::change::{Change, Record};
use super::scope::SubscriptionScope;
use super::scoped_list::{ApplyOutcome, IgnoreReason, ScopedList};
use super::status::{StatusSignal, SubscriptionStatus};
use crate::errors::{Error, Result};

/// Status and rows of one subscription scope.
#[derive(Debug, Clone)]
pub struct ScopeState<T> {
    status: SubscriptionStatus,
    list: ScopedList<T>,
}

impl<T: Record> ScopeState<T> {
    fn new() -> Self {
        Self {
            status: SubscriptionStatus::Connecting,
            list: ScopedList::new(),
        }
    }

    pub fn status(&self) -> &SubscriptionStatus {
        &self.status
    }

    pub fn list(&self) -> &ScopedList<T> {
        &self.list
    }
}

/// Point-in-time view of a scope, rows in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeSnapshot<T> {
    pub scope: SubscriptionScope,
    pub status: SubscriptionStatus,
    pub items: Vec<T>,
}

/// Owns one [`ScopedList`] per subscription scope.
#[derive(Debug, Clone)]
pub struct Reconciler<T> {
    scopes: HashMap<SubscriptionScope, ScopeState<T>>,
}

impl<T> Default for Reconciler<T> {
    fn default() -> Self {
        Self {
            scopes: HashMap::new(),
        }
    }
}

impl<T: Record> Reconciler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a scope in `Connecting`. An open scope is left as is;
    /// a closed one starts over empty.
    pub fn open(&mut self, scope: SubscriptionScope) -> &ScopeState<T> {
        let state = self.scopes.entry(scope).or_insert_with(ScopeState::new);
        if state.status.is_closed() {
            *state = ScopeState::new();
        }
        state
    }

    pub fn acknowledge(&mut self, scope: &SubscriptionScope) -> Result<SubscriptionStatus> {
        self.signal(scope, StatusSignal::Acknowledged)
    }

    pub fn report_error(
        &mut self,
        scope: &SubscriptionScope,
        reason: impl Into<String>,
    ) -> Result<SubscriptionStatus> {
        self.signal(scope, StatusSignal::Failed(reason.into()))
    }

    pub fn close(&mut self, scope: &SubscriptionScope) -> Result<()> {
        self.signal(scope, StatusSignal::TornDown).map(|_| ())
    }

    pub fn apply(&mut self, scope: &SubscriptionScope, change: Change<T>) -> Result<ApplyOutcome> {
        let state = self.live_state(scope)?;
        Ok(match change.localize(scope) {
            Some(change) => state.list.apply(change),
            None => ApplyOutcome::Ignored(IgnoreReason::OutOfScope),
        })
    }

    /// Replaces a scope's rows with a fresh fetch. Rows outside the scope
    /// are dropped.
    pub fn resync(&mut self, scope: &SubscriptionScope, rows: Vec<T>) -> Result<()> {
        let state = self.live_state(scope)?;
        state
            .list
            .resync(rows.into_iter().filter(|r| r.in_scope(scope)).collect());
        Ok(())
    }

    pub fn snapshot(&self, scope: &SubscriptionScope) -> Option<ScopeSnapshot<T>> {
        self.scopes.get(scope).map(|state| ScopeSnapshot {
            scope: scope.clone(),
            status: state.status.clone(),
            items: state.list.ordered(),
        })
    }

    pub fn status(&self, scope: &SubscriptionScope) -> Option<&SubscriptionStatus> {
        self.scopes.get(scope).map(|state| &state.status)
    }

    pub fn state(&self, scope: &SubscriptionScope) -> Option<&ScopeState<T>> {
        self.scopes.get(scope)
    }

    /// Stops tracking a scope entirely.
    pub fn forget(&mut self, scope: &SubscriptionScope) -> Option<ScopeState<T>> {
        self.scopes.remove(scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &SubscriptionScope> {
        self.scopes.keys()
    }

    fn state_mut(&mut self, scope: &SubscriptionScope) -> Result<&mut ScopeState<T>> {
        self.scopes
            .get_mut(scope)
            .ok_or_else(|| Error::Realtime(format!("scope {} is not open", scope)))
    }

    fn live_state(&mut self, scope: &SubscriptionScope) -> Result<&mut ScopeState<T>> {
        let state = self.state_mut(scope)?;
        if state.status.is_closed() {
            return Err(Error::Realtime(format!("scope {} is closed", scope)));
        }
        Ok(state)
    }

    fn signal(
        &mut self,
        scope: &SubscriptionScope,
        signal: StatusSignal,
    ) -> Result<SubscriptionStatus> {
        let state = self.state_mut(scope)?;
        state.status = state.status.transition(signal)?;
        Ok(state.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::{FriendRequest, FriendRequestStatus};
    use crate::tasks::{Priority, Task};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(seconds: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::seconds(seconds)
    }

    fn task(id: &str, owner: &str, board: Option<&str>, sort_order: i64) -> Task {
        Task {
            id: id.to_string(),
            user_id: owner.to_string(),
            shared_board_id: board.map(str::to_string),
            title: id.to_string(),
            description: None,
            priority: Priority::Medium,
            completed: false,
            completed_at: None,
            sort_order,
            created_at: at(0),
            updated_at: at(sort_order),
        }
    }

    #[test]
    fn test_scopes_are_independent() {
        let personal = SubscriptionScope::personal("alice");
        let board = SubscriptionScope::board("board-1");
        let mut reconciler = Reconciler::new();
        reconciler.open(personal.clone());
        reconciler.open(board.clone());

        let mine = task("t1", "alice", None, 0);
        let shared = task("t2", "alice", Some("board-1"), 0);

        assert_eq!(
            reconciler.apply(&personal, Change::insert(mine.clone())).unwrap(),
            ApplyOutcome::Inserted
        );
        assert_eq!(
            reconciler.apply(&personal, Change::insert(shared.clone())).unwrap(),
            ApplyOutcome::Ignored(IgnoreReason::OutOfScope)
        );
        assert_eq!(
            reconciler.apply(&board, Change::insert(shared)).unwrap(),
            ApplyOutcome::Inserted
        );

        let personal_ids: Vec<_> = reconciler
            .snapshot(&personal)
            .unwrap()
            .items
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(personal_ids, vec!["t1"]);
        assert_eq!(reconciler.snapshot(&board).unwrap().items.len(), 1);
    }

    #[test]
    fn test_snapshot_is_render_ordered() {
        let scope = SubscriptionScope::personal("alice");
        let mut reconciler = Reconciler::new();
        reconciler.open(scope.clone());
        reconciler
            .resync(
                &scope,
                vec![
                    task("c", "alice", None, 3),
                    task("a", "alice", None, 1),
                    task("b", "alice", None, 2),
                ],
            )
            .unwrap();

        let mut moved = task("c", "alice", None, 0);
        moved.updated_at = at(10);
        reconciler
            .apply(&scope, Change::update(None, moved))
            .unwrap();

        let ids: Vec<_> = reconciler
            .snapshot(&scope)
            .unwrap()
            .items
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_closed_scope_rejects_changes_until_reopened() {
        let scope = SubscriptionScope::personal("alice");
        let mut reconciler = Reconciler::new();
        reconciler.open(scope.clone());
        reconciler.acknowledge(&scope).unwrap();
        reconciler
            .apply(&scope, Change::insert(task("t1", "alice", None, 0)))
            .unwrap();
        reconciler.close(&scope).unwrap();

        assert!(reconciler
            .apply(&scope, Change::insert(task("t2", "alice", None, 0)))
            .is_err());
        assert!(reconciler.acknowledge(&scope).is_err());
        assert!(reconciler.resync(&scope, Vec::new()).is_err());
        assert_eq!(
            reconciler.status(&scope),
            Some(&SubscriptionStatus::Closed)
        );

        let reopened = reconciler.open(scope.clone());
        assert_eq!(reopened.status(), &SubscriptionStatus::Connecting);
        assert!(reopened.list().is_empty());
    }

    #[test]
    fn test_unknown_scope_is_an_error() {
        let mut reconciler: Reconciler<Task> = Reconciler::new();
        let err = reconciler
            .acknowledge(&SubscriptionScope::board("nope"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unknown);
        assert!(reconciler.snapshot(&SubscriptionScope::board("nope")).is_none());
    }

    #[test]
    fn test_accepted_request_leaves_incoming_scope() {
        let scope = SubscriptionScope::incoming_requests("bob");
        let mut reconciler = Reconciler::new();
        reconciler.open(scope.clone());

        let pending = FriendRequest {
            id: "req-1".to_string(),
            sender_id: "alice".to_string(),
            receiver_id: "bob".to_string(),
            status: FriendRequestStatus::Pending,
            created_at: at(0),
            updated_at: at(0),
        };
        reconciler
            .apply(&scope, Change::insert(pending.clone()))
            .unwrap();
        assert_eq!(reconciler.snapshot(&scope).unwrap().items.len(), 1);

        let accepted = FriendRequest {
            status: FriendRequestStatus::Accepted,
            updated_at: at(5),
            ..pending.clone()
        };
        assert_eq!(
            reconciler
                .apply(&scope, Change::update(Some(pending), accepted))
                .unwrap(),
            ApplyOutcome::Removed
        );
        assert!(reconciler.snapshot(&scope).unwrap().items.is_empty());
    }
}
