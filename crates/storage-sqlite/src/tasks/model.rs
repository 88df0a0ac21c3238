//! Database models for tasks.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use twodo_core::tasks::Task;
use twodo_core::Error;

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskDB {
    pub id: String,
    pub user_id: String,
    pub shared_board_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Column changes for a task update. `None` leaves a column untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::tasks)]
pub struct TaskChangesetDB {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<NaiveDateTime>>,
    pub sort_order: Option<i64>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<TaskDB> for Task {
    type Error = Error;

    fn try_from(db: TaskDB) -> Result<Self, Self::Error> {
        Ok(Task {
            priority: db.priority.parse()?,
            id: db.id,
            user_id: db.user_id,
            shared_board_id: db.shared_board_id,
            title: db.title,
            description: db.description,
            completed: db.completed,
            completed_at: db.completed_at,
            sort_order: db.sort_order,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<&Task> for TaskDB {
    fn from(task: &Task) -> Self {
        TaskDB {
            id: task.id.clone(),
            user_id: task.user_id.clone(),
            shared_board_id: task.shared_board_id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority.as_str().to_string(),
            completed: task.completed,
            completed_at: task.completed_at,
            sort_order: task.sort_order,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

pub(crate) fn into_tasks(rows: Vec<TaskDB>) -> twodo_core::Result<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}
