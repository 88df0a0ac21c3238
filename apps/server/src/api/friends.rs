use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    main_lib::AppState,
    models::{data, AcceptedRequest, Data, Friend, FriendRequest, PendingRequest, SendFriendRequest},
};

#[utoipa::path(get, path = "/api/v1/friends", responses((status = 200, body = [Friend])))]
pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<Vec<Friend>>>> {
    let friends = state.relationship_service.list_friends(&user.user_id)?;
    Ok(data(friends.into_iter().map(Friend::from).collect()))
}

#[utoipa::path(delete, path = "/api/v1/friends/{friend_id}", params(("friend_id" = String, Path, description = "Friend profile id")), responses((status = 204)))]
pub async fn remove_friend(
    ApiPath(friend_id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    state
        .relationship_service
        .remove_friend(&user.user_id, &friend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pending requests addressed to the caller, newest first.
#[utoipa::path(get, path = "/api/v1/friends/requests", responses((status = 200, body = [PendingRequest])))]
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<Vec<PendingRequest>>>> {
    let pending = state
        .relationship_service
        .list_pending_requests(&user.user_id)?;
    Ok(data(pending.into_iter().map(PendingRequest::from).collect()))
}

#[utoipa::path(post, path = "/api/v1/friends/requests", request_body = SendFriendRequest, responses((status = 201, body = FriendRequest)))]
pub async fn send_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<SendFriendRequest>,
) -> ApiResult<(StatusCode, Json<Data<FriendRequest>>)> {
    let request = state
        .relationship_service
        .send_friend_request(&user.user_id, &payload.receiver_username)
        .await?;
    Ok((StatusCode::CREATED, data(FriendRequest::from(request))))
}

#[utoipa::path(post, path = "/api/v1/friends/requests/{id}/accept", params(("id" = String, Path, description = "Request id")), responses((status = 200, body = AcceptedRequest)))]
pub async fn accept_request(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<AcceptedRequest>>> {
    let accepted = state
        .relationship_service
        .accept_friend_request(&id, &user.user_id)
        .await?;
    Ok(data(AcceptedRequest::from(accepted)))
}

#[utoipa::path(post, path = "/api/v1/friends/requests/{id}/reject", params(("id" = String, Path, description = "Request id")), responses((status = 200, body = FriendRequest)))]
pub async fn reject_request(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Data<FriendRequest>>> {
    let rejected = state
        .relationship_service
        .reject_friend_request(&id, &user.user_id)
        .await?;
    Ok(data(FriendRequest::from(rejected)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/friends", get(list_friends))
        .route("/friends/requests", get(list_requests).post(send_request))
        .route("/friends/requests/{id}/accept", post(accept_request))
        .route("/friends/requests/{id}/reject", post(reject_request))
        .route("/friends/{friend_id}", delete(remove_friend))
}
