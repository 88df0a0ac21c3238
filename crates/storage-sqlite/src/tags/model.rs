//! Database models for tags.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use twodo_core::tags::{Tag, TaskTag};

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TagDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

impl From<TagDB> for Tag {
    fn from(db: TagDB) -> Self {
        Tag {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            color: db.color,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::task_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskTagDB {
    pub task_id: String,
    pub tag_id: String,
}

impl From<TaskTagDB> for TaskTag {
    fn from(db: TaskTagDB) -> Self {
        TaskTag {
            task_id: db.task_id,
            tag_id: db.tag_id,
        }
    }
}
