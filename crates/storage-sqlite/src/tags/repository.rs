use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use twodo_core::constants::DEFAULT_TAG_COLOR;
use twodo_core::errors::Error;
use twodo_core::relationships::ProcedureCode;
use twodo_core::tags::{NewTag, Tag, TagRepositoryTrait, TaskTag};
use twodo_core::Result;

use super::model::{TagDB, TaskTagDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{tags, task_tags};
use crate::tasks::load_task_for_tx;

pub struct TagRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TagRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TagRepository { pool, writer }
    }
}

/// Tags are private: only the owner may link them.
fn ensure_own_tag_tx(conn: &mut SqliteConnection, user_id: &str, tag_id: &str) -> Result<()> {
    let owned: bool = diesel::select(diesel::dsl::exists(
        tags::table
            .filter(tags::id.eq(tag_id))
            .filter(tags::user_id.eq(user_id)),
    ))
    .get_result(conn)
    .map_err(StorageError::from)?;
    if owned {
        Ok(())
    } else {
        Err(Error::procedure(ProcedureCode::NotFound, "Tag not found"))
    }
}

#[async_trait]
impl TagRepositoryTrait for TagRepository {
    fn list_tags(&self, user_id: &str) -> Result<Vec<Tag>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tags::table
            .filter(tags::user_id.eq(user_id))
            .order(tags::name.asc())
            .select(TagDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Tag> {
                let row = TagDB {
                    id: Uuid::new_v4().to_string(),
                    user_id,
                    name: new_tag.name,
                    color: new_tag
                        .color
                        .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
                    created_at: Utc::now().naive_utc(),
                };
                let inserted = diesel::insert_into(tags::table)
                    .values(&row)
                    .returning(TagDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Tag::from(inserted))
            })
            .await
    }

    async fn delete_tag(&self, user_id: &str, tag_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let tag_id = tag_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    tags::table
                        .filter(tags::id.eq(&tag_id))
                        .filter(tags::user_id.eq(&user_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_task_tags(&self, task_id: &str) -> Result<Vec<Tag>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = task_tags::table
            .inner_join(tags::table)
            .filter(task_tags::task_id.eq(task_id))
            .order(tags::name.asc())
            .select(TagDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn attach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<TaskTag> {
        let user_id = user_id.to_string();
        let link = TaskTagDB {
            task_id: task_id.to_string(),
            tag_id: tag_id.to_string(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TaskTag> {
                load_task_for_tx(conn, &user_id, &link.task_id)?;
                ensure_own_tag_tx(conn, &user_id, &link.tag_id)?;
                // Attaching an already attached tag is a no-op.
                diesel::insert_or_ignore_into(task_tags::table)
                    .values(&link)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(TaskTag::from(link))
            })
            .await
    }

    async fn detach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let task_id = task_id.to_string();
        let tag_id = tag_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                load_task_for_tx(conn, &user_id, &task_id)?;
                ensure_own_tag_tx(conn, &user_id, &tag_id)?;
                Ok(diesel::delete(
                    task_tags::table
                        .filter(task_tags::task_id.eq(&task_id))
                        .filter(task_tags::tag_id.eq(&tag_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}
