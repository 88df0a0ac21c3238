use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    main_lib::AppState,
    models::{self, data, Data, NewTag, Tag},
};

#[utoipa::path(get, path = "/api/v1/tags", responses((status = 200, body = [Tag])))]
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<Vec<Tag>>>> {
    let tags = state.tag_service.list_tags(&user.user_id)?;
    Ok(data(models::tags(tags)))
}

#[utoipa::path(post, path = "/api/v1/tags", request_body = NewTag, responses((status = 201, body = Tag)))]
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<NewTag>,
) -> ApiResult<(StatusCode, Json<Data<Tag>>)> {
    let tag = state
        .tag_service
        .create_tag(&user.user_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, data(Tag::from(tag))))
}

#[utoipa::path(delete, path = "/api/v1/tags/{id}", params(("id" = String, Path, description = "Tag id")), responses((status = 204)))]
pub async fn delete_tag(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    state.tag_service.delete_tag(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", delete(delete_tag))
}
