use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use twodo_core::ordering::MoveDirection;
use twodo_core::profiles as core_profiles;
use twodo_core::relationships as core_relationships;
use twodo_core::tags as core_tags;
use twodo_core::tasks::{self as core_tasks, Priority, TaskFilter};

/// Success envelope: every handler answers `{ "data": ... }`.
#[derive(Serialize, Debug)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T>(value: T) -> Json<Data<T>> {
    Json(Data { data: value })
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<core_profiles::Profile> for Profile {
    fn from(p: core_profiles::Profile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            full_name: p.full_name,
            avatar_url: p.avatar_url,
            created_at: p.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub shared_board_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "medium")]
    pub priority: Priority,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_tasks::Task> for Task {
    fn from(t: core_tasks::Task) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            shared_board_id: t.shared_board_id,
            title: t.title,
            description: t.description,
            priority: t.priority,
            completed: t.completed,
            completed_at: t.completed_at,
            sort_order: t.sort_order,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

pub fn tasks(list: Vec<core_tasks::Task>) -> Vec<Task> {
    list.into_iter().map(Task::from).collect()
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub shared_board_id: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl From<NewTask> for core_tasks::NewTask {
    fn from(t: NewTask) -> Self {
        Self {
            title: t.title,
            description: t.description,
            priority: t.priority,
            shared_board_id: t.shared_board_id,
            sort_order: t.sort_order,
        }
    }
}

/// Partial update. `"description": null` clears the description.
#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl From<TaskUpdate> for core_tasks::TaskUpdate {
    fn from(u: TaskUpdate) -> Self {
        Self {
            title: u.title,
            description: u.description,
            priority: u.priority,
            completed: u.completed,
            sort_order: u.sort_order,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct MoveTaskRequest {
    #[schema(value_type = String, example = "up")]
    pub direction: MoveDirection,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub filter: Option<TaskFilter>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FilterQuery {
    #[serde(default)]
    pub filter: Option<TaskFilter>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

impl From<core_tags::Tag> for Tag {
    fn from(t: core_tags::Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            color: t.color,
            created_at: t.created_at,
        }
    }
}

pub fn tags(list: Vec<core_tags::Tag>) -> Vec<Tag> {
    list.into_iter().map(Tag::from).collect()
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<NewTag> for core_tags::NewTag {
    fn from(t: NewTag) -> Self {
        Self {
            name: t.name,
            color: t.color,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct TaskTag {
    pub task_id: String,
    pub tag_id: String,
}

impl From<core_tags::TaskTag> for TaskTag {
    fn from(t: core_tags::TaskTag) -> Self {
        Self {
            task_id: t.task_id,
            tag_id: t.tag_id,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_relationships::FriendRequest> for FriendRequest {
    fn from(r: core_relationships::FriendRequest) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            receiver_id: r.receiver_id,
            status: r.status.to_string(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct PendingRequest {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub sender: Profile,
}

impl From<core_relationships::PendingRequest> for PendingRequest {
    fn from(p: core_relationships::PendingRequest) -> Self {
        Self {
            request: FriendRequest::from(p.request),
            sender: Profile::from(p.sender),
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct SendFriendRequest {
    pub receiver_username: String,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct Friendship {
    pub user_id: String,
    pub friend_id: String,
    pub created_at: NaiveDateTime,
}

impl From<core_relationships::Friendship> for Friendship {
    fn from(f: core_relationships::Friendship) -> Self {
        Self {
            user_id: f.user_id,
            friend_id: f.friend_id,
            created_at: f.created_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct AcceptedRequest {
    pub request: FriendRequest,
    pub friendships: Vec<Friendship>,
}

impl From<core_relationships::AcceptedRequest> for AcceptedRequest {
    fn from(a: core_relationships::AcceptedRequest) -> Self {
        Self {
            request: FriendRequest::from(a.request),
            friendships: a.friendships.into_iter().map(Friendship::from).collect(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct Friend {
    pub friend_id: String,
    pub since: NaiveDateTime,
    pub profile: Profile,
}

impl From<core_relationships::FriendWithProfile> for Friend {
    fn from(f: core_relationships::FriendWithProfile) -> Self {
        Self {
            friend_id: f.friend_id,
            since: f.since,
            profile: Profile::from(f.profile),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SharedBoard {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl From<core_relationships::SharedBoard> for SharedBoard {
    fn from(b: core_relationships::SharedBoard) -> Self {
        Self {
            id: b.id,
            name: b.name,
            created_by: b.created_by,
            created_at: b.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct NewSharedBoard {
    pub name: String,
    pub friend_id: String,
}

#[derive(Deserialize, Debug)]
pub struct SearchQuery {
    #[serde(default)]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: TaskUpdate = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(absent.description, None);
        let cleared: TaskUpdate = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
    }

    #[test]
    fn test_pending_request_flattens_request_fields() {
        let at = chrono::Utc::now().naive_utc();
        let pending = PendingRequest {
            request: FriendRequest {
                id: "r1".into(),
                sender_id: "a".into(),
                receiver_id: "b".into(),
                status: "pending".into(),
                created_at: at,
                updated_at: at,
            },
            sender: Profile {
                id: "a".into(),
                username: "alice".into(),
                full_name: None,
                avatar_url: None,
                created_at: at,
            },
        };
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["sender"]["username"], "alice");
    }
}
