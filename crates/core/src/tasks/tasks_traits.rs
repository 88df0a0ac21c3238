use async_trait::async_trait;

use super::tasks_model::{NewTask, Task, TaskFilter, TaskUpdate};
use crate::errors::Result;
use crate::ordering::{MoveDirection, SortSwap};

/// Trait for task repository operations
#[async_trait]
pub trait TaskRepositoryTrait: Send + Sync {
    /// Tasks on the user's personal list, in render order.
    fn list_personal(&self, user_id: &str) -> Result<Vec<Task>>;
    /// Tasks on a shared board, in render order.
    fn list_board(&self, board_id: &str) -> Result<Vec<Task>>;
    fn get_task(&self, task_id: &str) -> Result<Task>;
    /// Inserts a normalized task. Board tasks require membership.
    async fn create_task(&self, user_id: &str, new_task: NewTask) -> Result<Task>;
    async fn update_task(&self, user_id: &str, task_id: &str, update: TaskUpdate) -> Result<Task>;
    /// Deletes the task and returns the row as it was.
    async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<Task>;
    /// Rewrites both keys of the swap in one transaction, each only if the
    /// row still holds the key the swap was planned from. Returns the rows
    /// actually updated.
    async fn swap_sort_order(&self, user_id: &str, swap: SortSwap) -> Result<Vec<Task>>;
}

/// Trait for task service operations
#[async_trait]
pub trait TaskServiceTrait: Send + Sync {
    fn list_personal_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>>;
    fn list_board_tasks(
        &self,
        user_id: &str,
        board_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>>;
    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Task>;
    async fn create_task(&self, user_id: &str, new_task: NewTask) -> Result<Task>;
    async fn update_task(&self, user_id: &str, task_id: &str, update: TaskUpdate) -> Result<Task>;
    async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<()>;
    /// Moves a task one step within the list as filtered by `filter`.
    /// Returns the rewritten tasks, or nothing at a boundary.
    async fn move_task(
        &self,
        user_id: &str,
        task_id: &str,
        direction: MoveDirection,
        filter: TaskFilter,
    ) -> Result<Vec<Task>>;
}
