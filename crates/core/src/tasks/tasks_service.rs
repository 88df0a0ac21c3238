use std::sync::Arc;

use log::{debug, warn};

use super::tasks_model::{NewTask, Task, TaskFilter, TaskList, TaskUpdate};
use super::tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
use crate::errors::{Error, Result};
use crate::ordering::{self, MoveDirection};
use crate::relationships::{ensure_board_member, RelationshipError, RelationshipRepositoryTrait};

/// Service for managing tasks on personal lists and shared boards.
pub struct TaskService {
    repository: Arc<dyn TaskRepositoryTrait>,
    relationships: Arc<dyn RelationshipRepositoryTrait>,
}

impl TaskService {
    pub fn new(
        repository: Arc<dyn TaskRepositoryTrait>,
        relationships: Arc<dyn RelationshipRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            relationships,
        }
    }

    fn authorize(&self, user_id: &str, list: &TaskList) -> Result<()> {
        match list {
            TaskList::Personal(owner) if owner == user_id => Ok(()),
            TaskList::Personal(_) => Err(RelationshipError::Forbidden(
                "Forbidden: task belongs to another user".to_string(),
            )
            .into()),
            TaskList::Board(board_id) => {
                ensure_board_member(self.relationships.as_ref(), board_id, user_id).map(|_| ())
            }
        }
    }

    /// Loads the list in render order with the filter applied.
    fn load_list(&self, list: &TaskList, filter: TaskFilter) -> Result<Vec<Task>> {
        let mut tasks = match list {
            TaskList::Personal(owner) => self.repository.list_personal(owner)?,
            TaskList::Board(board_id) => self.repository.list_board(board_id)?,
        };
        ordering::sort_tasks(&mut tasks);
        Ok(filter.apply(tasks))
    }
}

#[async_trait::async_trait]
impl TaskServiceTrait for TaskService {
    fn list_personal_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>> {
        self.load_list(&TaskList::Personal(user_id.to_string()), filter)
    }

    fn list_board_tasks(
        &self,
        user_id: &str,
        board_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>> {
        let list = TaskList::Board(board_id.to_string());
        self.authorize(user_id, &list)?;
        self.load_list(&list, filter)
    }

    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Task> {
        let task = self.repository.get_task(task_id)?;
        self.authorize(user_id, &task.list())?;
        Ok(task)
    }

    async fn create_task(&self, user_id: &str, new_task: NewTask) -> Result<Task> {
        let new_task = new_task.normalize()?;
        if let Some(board_id) = &new_task.shared_board_id {
            self.authorize(user_id, &TaskList::Board(board_id.clone()))?;
        }
        debug!("Creating task '{}' for {}", new_task.title, user_id);
        self.repository.create_task(user_id, new_task).await
    }

    async fn update_task(&self, user_id: &str, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let update = update.normalize()?;
        if update.is_empty() {
            return self.get_task(user_id, task_id);
        }
        self.repository.update_task(user_id, task_id, update).await
    }

    async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<()> {
        let deleted = self.repository.delete_task(user_id, task_id).await?;
        debug!("Deleted task {} ('{}')", deleted.id, deleted.title);
        Ok(())
    }

    async fn move_task(
        &self,
        user_id: &str,
        task_id: &str,
        direction: MoveDirection,
        filter: TaskFilter,
    ) -> Result<Vec<Task>> {
        let task = self.get_task(user_id, task_id)?;
        let visible = self.load_list(&task.list(), filter)?;

        let Some(swap) = ordering::plan_move(&visible, task_id, direction)? else {
            return Ok(Vec::new());
        };

        let expected = swap.changes().len();
        let updated = self.repository.swap_sort_order(user_id, swap.clone()).await?;
        if updated.len() != expected {
            warn!(
                "Partial sort swap for {:?}: {} of {} rows updated",
                swap.task_ids(),
                updated.len(),
                expected
            );
            return Err(Error::ReconcileRequired(format!(
                "Moving task {} updated {} of {} rows",
                task_id,
                updated.len(),
                expected
            )));
        }
        Ok(updated)
    }
}
