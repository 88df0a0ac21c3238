use async_trait::async_trait;

use super::tags_model::{NewTag, Tag, TaskTag};
use crate::errors::Result;

/// Trait for tag repository operations
#[async_trait]
pub trait TagRepositoryTrait: Send + Sync {
    /// Tags owned by the user, ordered by name.
    fn list_tags(&self, user_id: &str) -> Result<Vec<Tag>>;
    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag>;
    async fn delete_tag(&self, user_id: &str, tag_id: &str) -> Result<usize>;
    fn list_task_tags(&self, task_id: &str) -> Result<Vec<Tag>>;
    async fn attach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<TaskTag>;
    async fn detach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<usize>;
}

/// Trait for tag service operations
#[async_trait]
pub trait TagServiceTrait: Send + Sync {
    fn list_tags(&self, user_id: &str) -> Result<Vec<Tag>>;
    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag>;
    async fn delete_tag(&self, user_id: &str, tag_id: &str) -> Result<()>;
    fn list_task_tags(&self, user_id: &str, task_id: &str) -> Result<Vec<Tag>>;
    async fn attach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<TaskTag>;
    async fn detach_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<()>;
    /// Attaches the tag if absent, detaches it otherwise. Returns whether
    /// the tag is attached afterwards.
    async fn toggle_tag(&self, user_id: &str, task_id: &str, tag_id: &str) -> Result<bool>;
}
