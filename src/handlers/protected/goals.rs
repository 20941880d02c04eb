use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::GoalView;
use crate::handlers::{json_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::{Contribution, CreateGoal, UpdateGoal};

const GOAL_NOT_FOUND: &str = "Goal not found";

/// GET /goals
pub async fn goal_list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<GoalView>> {
    let goals = state.goals().list(auth.user_id).await?;
    Ok(ApiResponse::keyed("goals", goals))
}

/// POST /goals
pub async fn goal_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<CreateGoal>, JsonRejection>,
) -> ApiResult<GoalView> {
    let goal = state.goals().create(auth.user_id, json_body(body)?).await?;
    Ok(ApiResponse::keyed("goal", goal).created())
}

/// GET /goals/:goal_id
pub async fn goal_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(goal_id): Path<String>,
) -> ApiResult<GoalView> {
    let goal_id = parse_id(&goal_id, GOAL_NOT_FOUND)?;
    let goal = state.goals().get(goal_id, auth.user_id).await?;
    Ok(ApiResponse::keyed("goal", goal))
}

/// PUT /goals/:goal_id
pub async fn goal_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(goal_id): Path<String>,
    body: Result<Json<UpdateGoal>, JsonRejection>,
) -> ApiResult<GoalView> {
    let goal_id = parse_id(&goal_id, GOAL_NOT_FOUND)?;
    let input = json_body(body)?;
    let goal = state.goals().update(goal_id, auth.user_id, input).await?;
    Ok(ApiResponse::keyed("goal", goal))
}

/// DELETE /goals/:goal_id
pub async fn goal_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(goal_id): Path<String>,
) -> ApiResult<Value> {
    let goal_id = parse_id(&goal_id, GOAL_NOT_FOUND)?;
    state.goals().delete(goal_id, auth.user_id).await?;
    Ok(ApiResponse::message("Goal deleted successfully"))
}

/// POST /goals/:goal_id/contribute
pub async fn goal_contribute(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(goal_id): Path<String>,
    body: Result<Json<Contribution>, JsonRejection>,
) -> ApiResult<GoalView> {
    let goal_id = parse_id(&goal_id, GOAL_NOT_FOUND)?;
    let input = json_body(body)?;
    let goal = state.goals().contribute(goal_id, auth.user_id, input).await?;
    Ok(ApiResponse::keyed("goal", goal))
}
