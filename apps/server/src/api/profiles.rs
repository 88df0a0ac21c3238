use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::ApiQuery,
    main_lib::AppState,
    models::{data, Data, Profile, SearchQuery},
};

#[utoipa::path(get, path = "/api/v1/profiles/search", params(("username" = String, Query, description = "Username fragment")), responses((status = 200, body = [Profile])))]
pub async fn search_profiles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Data<Vec<Profile>>>> {
    let found = state
        .profile_service
        .search(&user.user_id, &query.username)?;
    Ok(data(found.into_iter().map(Profile::from).collect()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/profiles/search", get(search_profiles))
}
