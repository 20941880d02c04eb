// handlers/protected/groups.rs - Shared expense groups and their memberships
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::group::MemberView;
use crate::database::models::GroupView;
use crate::handlers::{json_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::{AddMemberInput, GroupInput};

const GROUP_NOT_FOUND: &str = "Group not found";

/// GET /groups - groups the caller created or belongs to
pub async fn group_list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<GroupView>> {
    let groups = state.groups().list(auth.user_id).await?;
    Ok(ApiResponse::keyed("groups", groups))
}

/// POST /groups
pub async fn group_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<GroupInput>, JsonRejection>,
) -> ApiResult<GroupView> {
    let group = state.groups().create(auth.user_id, json_body(body)?).await?;
    Ok(ApiResponse::keyed("group", group).created())
}

/// GET /groups/:group_id
pub async fn group_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<GroupView> {
    let group_id = parse_id(&group_id, GROUP_NOT_FOUND)?;
    let group = state.groups().get(group_id, auth.user_id).await?;
    Ok(ApiResponse::keyed("group", group))
}

/// PUT /groups/:group_id
pub async fn group_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
    body: Result<Json<GroupInput>, JsonRejection>,
) -> ApiResult<GroupView> {
    let group_id = parse_id(&group_id, GROUP_NOT_FOUND)?;
    let input = json_body(body)?;
    let group = state.groups().update(group_id, auth.user_id, input).await?;
    Ok(ApiResponse::keyed("group", group))
}

/// DELETE /groups/:group_id - creator only
pub async fn group_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<Value> {
    let group_id = parse_id(&group_id, GROUP_NOT_FOUND)?;
    state.groups().delete(group_id, auth.user_id).await?;
    Ok(ApiResponse::message("Group deleted successfully"))
}

/// POST /groups/:group_id/members
pub async fn member_add(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
    body: Result<Json<AddMemberInput>, JsonRejection>,
) -> ApiResult<MemberView> {
    let group_id = parse_id(&group_id, GROUP_NOT_FOUND)?;
    let input = json_body(body)?;
    let member = state.groups().add_member(group_id, auth.user_id, input).await?;
    Ok(ApiResponse::keyed("member", member).created())
}

/// DELETE /groups/:group_id/members/:member_id - `member_id` is the membership row id
pub async fn member_remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, member_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let group_id = parse_id(&group_id, GROUP_NOT_FOUND)?;
    let member_id = parse_id(&member_id, "Member not found in this group")?;
    state.groups().remove_member(group_id, auth.user_id, member_id).await?;
    Ok(ApiResponse::message("Member removed successfully"))
}
