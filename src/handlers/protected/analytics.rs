// handlers/protected/analytics.rs - Read-only spending analytics
//
// All period math is anchored on the server's current UTC date.
use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::NaiveDate;

use crate::analytics::aggregate::{
    Comparison, Dashboard, GoalsProgress, GroupAnalytics, MonthlyTrend, SpendingOverview, TopExpense,
};
use crate::analytics::AnalyticsParams;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// GET /analytics/overview?startDate&endDate
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<SpendingOverview> {
    let range = params.range()?;
    let overview = state.analytics().overview(auth.user_id, range).await?;
    Ok(ApiResponse::success(overview))
}

/// GET /analytics/trends?months
pub async fn trends(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Vec<MonthlyTrend>> {
    let months = params.months()?;
    let trends = state.analytics().trends(auth.user_id, months, today()).await?;
    Ok(ApiResponse::success(trends))
}

/// GET /analytics/top-expenses?limit
pub async fn top_expenses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Vec<TopExpense>> {
    let limit = params.limit(&state.config.filter)?;
    let top = state.analytics().top_expenses(auth.user_id, limit).await?;
    Ok(ApiResponse::success(top))
}

/// GET /analytics/groups
pub async fn groups(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<GroupAnalytics>> {
    let groups = state.analytics().groups(auth.user_id).await?;
    Ok(ApiResponse::success(groups))
}

/// GET /analytics/goals
pub async fn goals(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<GoalsProgress> {
    let goals = state.analytics().goals(auth.user_id).await?;
    Ok(ApiResponse::success(goals))
}

/// GET /analytics/comparison?period=month|year
pub async fn comparison(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Comparison> {
    let period = params.period()?;
    let comparison = state.analytics().comparison(auth.user_id, period, today()).await?;
    Ok(ApiResponse::success(comparison))
}

/// GET /analytics/dashboard - all sections or an error, never a partial dashboard
pub async fn dashboard(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Dashboard> {
    let dashboard = state.analytics().dashboard(auth.user_id, today()).await?;
    Ok(ApiResponse::success(dashboard))
}
