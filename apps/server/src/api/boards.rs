use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    main_lib::AppState,
    models::{self, data, Data, FilterQuery, NewSharedBoard, SharedBoard, Task},
};

#[utoipa::path(get, path = "/api/v1/boards", responses((status = 200, body = [SharedBoard])))]
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<Vec<SharedBoard>>>> {
    let boards = state.relationship_service.list_boards(&user.user_id)?;
    Ok(data(boards.into_iter().map(SharedBoard::from).collect()))
}

#[utoipa::path(post, path = "/api/v1/boards", request_body = NewSharedBoard, responses((status = 201, body = SharedBoard), (status = 403, description = "Not friends")))]
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<NewSharedBoard>,
) -> ApiResult<(StatusCode, Json<Data<SharedBoard>>)> {
    let board = state
        .relationship_service
        .create_shared_board(&user.user_id, &payload.name, &payload.friend_id)
        .await?;
    Ok((StatusCode::CREATED, data(SharedBoard::from(board))))
}

#[utoipa::path(get, path = "/api/v1/boards/{id}/tasks", params(("id" = String, Path, description = "Board id"), ("filter" = Option<String>, Query, description = "all|pending|completed|high|medium|low")), responses((status = 200, body = [Task])))]
pub async fn list_board_tasks(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<FilterQuery>,
) -> ApiResult<Json<Data<Vec<Task>>>> {
    let tasks = state.task_service.list_board_tasks(
        &user.user_id,
        &id,
        query.filter.unwrap_or_default(),
    )?;
    Ok(data(models::tasks(tasks)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/{id}/tasks", get(list_board_tasks))
}
