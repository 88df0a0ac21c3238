//! Ordering domain models.

use serde::{Deserialize, Serialize};

use crate::tasks::Task;

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn opposite(&self) -> MoveDirection {
        match self {
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
        }
    }
}

/// A sort key rewrite on one task. `from` is the key the planner observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKeyChange {
    pub task_id: String,
    pub from: i64,
    pub to: i64,
}

impl SortKeyChange {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    fn inverse(&self) -> SortKeyChange {
        SortKeyChange {
            task_id: self.task_id.clone(),
            from: self.to,
            to: self.from,
        }
    }
}

/// The key rewrites that move one task past its neighbour.
///
/// Usually a plain exchange of the two keys. Inside a run of tied keys the
/// neighbour and the tasks after it are pushed down instead, so `changes`
/// may name tasks other than the pair. All changes are applied together or
/// not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSwap {
    pub moved: String,
    pub neighbour: String,
    pub changes: Vec<SortKeyChange>,
}

impl SortSwap {
    /// Applies the swap to a local copy of the list. Tasks not named by the
    /// swap are left alone. Returns the number of tasks rewritten.
    pub fn apply(&self, tasks: &mut [Task]) -> usize {
        let mut rewritten = 0;
        for task in tasks.iter_mut() {
            if let Some(change) = self.changes.iter().find(|c| c.task_id == task.id) {
                task.sort_order = change.to;
                rewritten += 1;
            }
        }
        rewritten
    }

    /// The swap that restores the keys this one rewrites.
    pub fn inverse(&self) -> SortSwap {
        SortSwap {
            moved: self.moved.clone(),
            neighbour: self.neighbour.clone(),
            changes: self.changes.iter().map(SortKeyChange::inverse).collect(),
        }
    }

    pub fn changes(&self) -> &[SortKeyChange] {
        &self.changes
    }

    pub fn task_ids(&self) -> [&str; 2] {
        [&self.moved, &self.neighbour]
    }
}
