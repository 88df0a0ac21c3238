use std::cmp::Ordering;

use log::debug;

use super::ordering_model::{MoveDirection, SortKeyChange, SortSwap};
use crate::errors::{DatabaseError, Error, Result};
use crate::tasks::Task;

/// Render order: open tasks first, then by sort key, creation time and id.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then(a.sort_order.cmp(&b.sort_order))
        .then(a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Plans a one-step move of `task_id` within `ordered`, which must already
/// be in render order (and filtered the way the user sees it).
///
/// Returns `Ok(None)` when the task sits at the edge of its group. Open and
/// completed tasks render as separate groups, so a move never crosses from
/// one into the other. The planned keys render `ordered` with exactly the
/// moved task and its neighbour exchanged.
pub fn plan_move(
    ordered: &[Task],
    task_id: &str,
    direction: MoveDirection,
) -> Result<Option<SortSwap>> {
    let index = ordered
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("Task {}", task_id))))?;

    let neighbour_index = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|i| *i < ordered.len()),
    };
    let Some(neighbour_index) = neighbour_index else {
        debug!("Task {} is already at the {:?} boundary", task_id, direction);
        return Ok(None);
    };

    let moved = &ordered[index];
    let neighbour = &ordered[neighbour_index];
    if moved.completed != neighbour.completed {
        return Ok(None);
    }

    let mut target: Vec<&Task> = ordered.iter().collect();
    target.swap(index, neighbour_index);
    let first = index.min(neighbour_index);

    let changes = match exchange(&target, first) {
        Some(changes) => changes,
        None => relink(&target, first),
    };
    Ok(Some(SortSwap {
        moved: moved.id.clone(),
        neighbour: neighbour.id.clone(),
        changes,
    }))
}

/// Render order of `a` before `b` with the given sort keys.
fn sorts_before(a: &Task, a_key: i64, b: &Task, b_key: i64) -> bool {
    a.completed
        .cmp(&b.completed)
        .then(a_key.cmp(&b_key))
        .then(a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
        == Ordering::Less
}

/// Exchanges the pair's keys when that alone renders `target`.
fn exchange(target: &[&Task], first: usize) -> Option<Vec<SortKeyChange>> {
    let (early, late) = (target[first], target[first + 1]);
    if early.sort_order == late.sort_order {
        return None;
    }
    let (early_key, late_key) = (late.sort_order, early.sort_order);

    let after_prev = first.checked_sub(1).map_or(true, |i| {
        sorts_before(target[i], target[i].sort_order, early, early_key)
    });
    let before_next = target.get(first + 2).map_or(true, |next| {
        sorts_before(late, late_key, next, next.sort_order)
    });
    (after_prev && before_next && sorts_before(early, early_key, late, late_key)).then(|| {
        vec![
            SortKeyChange {
                task_id: early.id.clone(),
                from: early.sort_order,
                to: early_key,
            },
            SortKeyChange {
                task_id: late.id.clone(),
                from: late.sort_order,
                to: late_key,
            },
        ]
    })
}

/// Walks `target` from the pair onward, raising each key just enough to sort
/// after its predecessor. Stops at the first task past the pair that already
/// does.
fn relink(target: &[&Task], first: usize) -> Vec<SortKeyChange> {
    let mut changes = Vec::new();
    let mut prev = first
        .checked_sub(1)
        .map(|i| (target[i], target[i].sort_order));

    for (offset, task) in target[first..].iter().enumerate() {
        let key = match prev {
            None => task.sort_order,
            Some((p, p_key)) if sorts_before(p, p_key, task, task.sort_order) => task.sort_order,
            Some((p, p_key)) if sorts_before(p, p_key, task, p_key) => p_key,
            Some((_, p_key)) => p_key.saturating_add(1),
        };
        if key == task.sort_order {
            if offset >= 2 {
                break;
            }
        } else {
            changes.push(SortKeyChange {
                task_id: task.id.clone(),
                from: task.sort_order,
                to: key,
            });
        }
        prev = Some((*task, key));
    }
    changes
}
