//! Ordering module - render order and single-step moves for task lists.

mod order_manager;
mod ordering_model;

pub use order_manager::{compare_tasks, plan_move, sort_tasks};
pub use ordering_model::{MoveDirection, SortKeyChange, SortSwap};
