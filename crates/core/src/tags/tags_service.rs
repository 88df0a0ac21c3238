use std::sync::Arc;

use log::debug;

use super::tags_model::{NewTag, Tag, TaskTag};
use super::tags_traits::{TagRepositoryTrait, TagServiceTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::tasks::TaskServiceTrait;

pub struct TagService {
    repository: Arc<dyn TagRepositoryTrait>,
    task_service: Arc<dyn TaskServiceTrait>,
}

impl TagService {
    pub fn new(
        repository: Arc<dyn TagRepositoryTrait>,
        task_service: Arc<dyn TaskServiceTrait>,
    ) -> Self {
        Self {
            repository,
            task_service,
        }
    }
}

#[async_trait::async_trait]
impl TagServiceTrait for TagService {
    fn list_tags(&self, user_id: &str) -> Result<Vec<Tag>> {
        self.repository.list_tags(user_id)
    }

    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag> {
        let new_tag = new_tag.normalize()?;
        self.repository.create_tag(user_id, new_tag).await
    }

    async fn delete_tag(&self, user_id: &str, tag_id: &str) -> Result<()> {
        let deleted = self.repository.delete_tag(user_id, tag_id).await?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Tag {} not found",
                tag_id
            ))));
        }
        Ok(())
    }

    fn list_task_tags(&self, user_id: &str, task_id: &str) -> Result<Vec<Tag>> {
        self.task_service.get_task(user_id, task_id)?;
        self.repository.list_task_tags(task_id)
    }

    async fn attach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<TaskTag> {
        self.repository.attach_tag(user_id, task_id, tag_id).await
    }

    async fn detach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<()> {
        let removed = self.repository.detach_tag(user_id, task_id, tag_id).await?;
        debug!("Detached {} tag links from task {}", removed, task_id);
        Ok(())
    }

    async fn toggle_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<bool> {
        let attached = self
            .list_task_tags(user_id, task_id)?
            .iter()
            .any(|t| t.id == tag_id);
        if attached {
            self.detach_tag(user_id, task_id, tag_id).await?;
        } else {
            self.attach_tag(user_id, task_id, tag_id).await?;
        }
        Ok(!attached)
    }
}
