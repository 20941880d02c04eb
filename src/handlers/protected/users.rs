use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::database::models::User;
use crate::handlers::{json_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::UpdateProfile;

/// GET /users/:id - self or admin
pub async fn user_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let target = parse_id(&id, "User not found")?;
    let user = state.users().get_profile(auth.user_id, auth.role, target).await?;
    Ok(ApiResponse::keyed("user", user))
}

/// PUT /users/:id - update name and/or email
pub async fn user_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProfile>, JsonRejection>,
) -> ApiResult<User> {
    let target = parse_id(&id, "User not found")?;
    let input = json_body(body)?;
    let user = state
        .users()
        .update_profile(auth.user_id, auth.role, target, input)
        .await?;
    Ok(ApiResponse::keyed("user", user))
}
