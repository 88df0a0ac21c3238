use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use twodo_core::constants::DEFAULT_SORT_ORDER;
use twodo_core::errors::Error;
use twodo_core::ordering::SortSwap;
use twodo_core::realtime::{Change, ChangeSink, RowChange};
use twodo_core::relationships::ProcedureCode;
use twodo_core::tasks::{NewTask, Task, TaskRepositoryTrait, TaskUpdate};
use twodo_core::Result;

use super::model::{into_tasks, TaskChangesetDB, TaskDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{board_members, tasks};

pub struct TaskRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    events: Arc<dyn ChangeSink>,
}

impl TaskRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, events: Arc<dyn ChangeSink>) -> Self {
        TaskRepository {
            pool,
            writer,
            events,
        }
    }
}

fn task_not_found() -> Error {
    Error::procedure(ProcedureCode::NotFound, "Task not found")
}

pub(crate) fn is_member_tx(
    conn: &mut SqliteConnection,
    board_id: &str,
    user_id: &str,
) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        board_members::table
            .filter(board_members::board_id.eq(board_id))
            .filter(board_members::user_id.eq(user_id)),
    ))
    .get_result(conn)
    .map_err(StorageError::from)?)
}

fn load_task_tx(conn: &mut SqliteConnection, task_id: &str) -> Result<TaskDB> {
    tasks::table
        .find(task_id)
        .select(TaskDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(task_not_found)
}

/// Owner of a personal task, or any member of the task's board.
pub(crate) fn authorize_task_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    task: &TaskDB,
) -> Result<()> {
    let allowed = match &task.shared_board_id {
        None => task.user_id == user_id,
        Some(board_id) => is_member_tx(conn, board_id, user_id)?,
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::procedure(
            ProcedureCode::Forbidden,
            "Forbidden: you cannot modify this task",
        ))
    }
}

/// Loads a task the user may modify.
pub(crate) fn load_task_for_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    task_id: &str,
) -> Result<TaskDB> {
    let task = load_task_tx(conn, task_id)?;
    authorize_task_tx(conn, user_id, &task)?;
    Ok(task)
}

#[async_trait]
impl TaskRepositoryTrait for TaskRepository {
    fn list_personal(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tasks::table
            .filter(tasks::user_id.eq(user_id))
            .filter(tasks::shared_board_id.is_null())
            .order((
                tasks::completed.asc(),
                tasks::sort_order.asc(),
                tasks::created_at.asc(),
                tasks::id.asc(),
            ))
            .select(TaskDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        into_tasks(rows)
    }

    fn list_board(&self, board_id: &str) -> Result<Vec<Task>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tasks::table
            .filter(tasks::shared_board_id.eq(board_id))
            .order((
                tasks::completed.asc(),
                tasks::sort_order.asc(),
                tasks::created_at.asc(),
                tasks::id.asc(),
            ))
            .select(TaskDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        into_tasks(rows)
    }

    fn get_task(&self, task_id: &str) -> Result<Task> {
        let mut conn = get_connection(&self.pool)?;
        Task::try_from(load_task_tx(&mut conn, task_id)?)
    }

    async fn create_task(&self, user_id: &str, new_task: NewTask) -> Result<Task> {
        let user_id = user_id.to_string();
        let created = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Task> {
                if let Some(board_id) = &new_task.shared_board_id {
                    if !is_member_tx(conn, board_id, &user_id)? {
                        return Err(Error::procedure(
                            ProcedureCode::Forbidden,
                            "Forbidden: you are not a member of this board",
                        ));
                    }
                }
                let now = Utc::now().naive_utc();
                let row = TaskDB {
                    id: Uuid::new_v4().to_string(),
                    user_id,
                    shared_board_id: new_task.shared_board_id,
                    title: new_task.title,
                    description: new_task.description,
                    priority: new_task.priority.unwrap_or_default().as_str().to_string(),
                    completed: false,
                    completed_at: None,
                    sort_order: new_task.sort_order.unwrap_or(DEFAULT_SORT_ORDER),
                    created_at: now,
                    updated_at: now,
                };
                let inserted = diesel::insert_into(tasks::table)
                    .values(&row)
                    .returning(TaskDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Task::try_from(inserted)
            })
            .await?;

        self.events
            .publish(RowChange::Tasks(Change::insert(created.clone())));
        Ok(created)
    }

    async fn update_task(&self, user_id: &str, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let user_id = user_id.to_string();
        let task_id = task_id.to_string();
        let (old, new) = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(Task, Task)> {
                let current = load_task_for_tx(conn, &user_id, &task_id)?;
                let now = Utc::now().naive_utc();

                // Completion time tracks the flag; it is cleared when a task is reopened.
                let completed_at = match update.completed {
                    Some(true) if !current.completed => Some(Some(now)),
                    Some(false) => Some(None),
                    _ => None,
                };
                let changes = TaskChangesetDB {
                    title: update.title,
                    description: update.description,
                    priority: update.priority.map(|p| p.as_str().to_string()),
                    completed: update.completed,
                    completed_at,
                    sort_order: update.sort_order,
                    updated_at: Some(now),
                };

                let updated = diesel::update(tasks::table.find(&task_id))
                    .set(&changes)
                    .returning(TaskDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok((Task::try_from(current)?, Task::try_from(updated)?))
            })
            .await?;

        self.events
            .publish(RowChange::Tasks(Change::update(Some(old), new.clone())));
        Ok(new)
    }

    async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<Task> {
        let user_id = user_id.to_string();
        let task_id = task_id.to_string();
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Task> {
                let current = load_task_for_tx(conn, &user_id, &task_id)?;
                diesel::delete(tasks::table.find(&task_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Task::try_from(current)
            })
            .await?;

        self.events
            .publish(RowChange::Tasks(Change::delete(deleted.clone())));
        Ok(deleted)
    }

    async fn swap_sort_order(&self, user_id: &str, swap: SortSwap) -> Result<Vec<Task>> {
        let user_id = user_id.to_string();
        let changes = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<(Task, Task)>> {
                let now = Utc::now().naive_utc();
                let mut changed = Vec::with_capacity(swap.changes().len());

                for change in swap.changes() {
                    let Some(current) = tasks::table
                        .find(&change.task_id)
                        .select(TaskDB::as_select())
                        .first(conn)
                        .optional()
                        .map_err(StorageError::from)?
                    else {
                        continue;
                    };
                    authorize_task_tx(conn, &user_id, &current)?;

                    // Skipped when another writer moved the row since the swap was planned.
                    let updated = diesel::update(
                        tasks::table
                            .filter(tasks::id.eq(&change.task_id))
                            .filter(tasks::sort_order.eq(change.from)),
                    )
                    .set((tasks::sort_order.eq(change.to), tasks::updated_at.eq(now)))
                    .returning(TaskDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                    if let Some(updated) = updated {
                        changed.push((Task::try_from(current)?, Task::try_from(updated)?));
                    }
                }

                if changed.len() != swap.changes().len() {
                    debug!(
                        "Sort swap of {:?} matched {} of {} rows, rolling back",
                        swap.task_ids(),
                        changed.len(),
                        swap.changes().len()
                    );
                    return Err(Error::ReconcileRequired(format!(
                        "Sort keys of {:?} changed since the move was planned",
                        swap.task_ids()
                    )));
                }
                Ok(changed)
            })
            .await?;

        let mut updated = Vec::with_capacity(changes.len());
        let mut events = Vec::with_capacity(changes.len());
        for (old, new) in changes {
            events.push(RowChange::Tasks(Change::update(Some(old), new.clone())));
            updated.push(new);
        }
        self.events.publish_batch(events);
        Ok(updated)
    }
}
