use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    main_lib::AppState,
    models::{self, data, Data, FilterQuery, MoveTaskRequest, NewTask, Tag, Task, TaskTag, TaskUpdate},
};

#[utoipa::path(get, path = "/api/v1/tasks", params(("filter" = Option<String>, Query, description = "all|pending|completed|high|medium|low")), responses((status = 200, body = [Task])))]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<FilterQuery>,
) -> ApiResult<Json<Data<Vec<Task>>>> {
    let tasks = state
        .task_service
        .list_personal_tasks(&user.user_id, query.filter.unwrap_or_default())?;
    Ok(data(models::tasks(tasks)))
}

#[utoipa::path(post, path = "/api/v1/tasks", request_body = NewTask, responses((status = 201, body = Task)))]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<Data<Task>>)> {
    let created = state
        .task_service
        .create_task(&user.user_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, data(Task::from(created))))
}

#[utoipa::path(patch, path = "/api/v1/tasks/{id}", params(("id" = String, Path, description = "Task id")), request_body = TaskUpdate, responses((status = 200, body = Task)))]
pub async fn update_task(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<TaskUpdate>,
) -> ApiResult<Json<Data<Task>>> {
    let updated = state
        .task_service
        .update_task(&user.user_id, &id, payload.into())
        .await?;
    Ok(data(Task::from(updated)))
}

#[utoipa::path(delete, path = "/api/v1/tasks/{id}", params(("id" = String, Path, description = "Task id")), responses((status = 204)))]
pub async fn delete_task(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    state.task_service.delete_task(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the rewritten tasks, or an empty list at a boundary.
#[utoipa::path(post, path = "/api/v1/tasks/{id}/move", params(("id" = String, Path, description = "Task id")), request_body = MoveTaskRequest, responses((status = 200, body = [Task]), (status = 409, description = "Sort keys changed concurrently; refetch")))]
pub async fn move_task(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<MoveTaskRequest>,
) -> ApiResult<Json<Data<Vec<Task>>>> {
    let moved = state
        .task_service
        .move_task(
            &user.user_id,
            &id,
            payload.direction,
            payload.filter.unwrap_or_default(),
        )
        .await?;
    Ok(data(models::tasks(moved)))
}

#[utoipa::path(get, path = "/api/v1/tasks/{id}/tags", params(("id" = String, Path, description = "Task id")), responses((status = 200, body = [Tag])))]
pub async fn list_task_tags(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<Vec<Tag>>>> {
    let tags = state.tag_service.list_task_tags(&user.user_id, &id)?;
    Ok(data(models::tags(tags)))
}

#[utoipa::path(put, path = "/api/v1/tasks/{id}/tags/{tag_id}", params(("id" = String, Path, description = "Task id"), ("tag_id" = String, Path, description = "Tag id")), responses((status = 200, body = TaskTag)))]
pub async fn attach_tag(
    ApiPath((id, tag_id)): ApiPath<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<TaskTag>>> {
    let link = state
        .tag_service
        .attach_tag(&user.user_id, &id, &tag_id)
        .await?;
    Ok(data(TaskTag::from(link)))
}

#[utoipa::path(delete, path = "/api/v1/tasks/{id}/tags/{tag_id}", params(("id" = String, Path, description = "Task id"), ("tag_id" = String, Path, description = "Tag id")), responses((status = 204)))]
pub async fn detach_tag(
    ApiPath((id, tag_id)): ApiPath<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    state
        .tag_service
        .detach_tag(&user.user_id, &id, &tag_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/tasks/{id}/move", post(move_task))
        .route("/tasks/{id}/tags", get(list_task_tags))
        .route("/tasks/{id}/tags/{tag_id}", put(attach_tag).delete(detach_tag))
}
