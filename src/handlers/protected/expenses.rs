// handlers/protected/expenses.rs - Expense listing and owner-only mutation
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::ExpenseRecord;
use crate::filter::ExpenseQueryParams;
use crate::handlers::{json_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::{CreateExpense, ExpenseListing, UpdateExpense};

/// GET /expenses - filtered, sorted, paginated listing of the caller's expenses
pub async fn expense_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ExpenseQueryParams>,
) -> ApiResult<ExpenseListing> {
    let listing = state.expenses().list(auth.user_id, &params).await?;
    Ok(ApiResponse::flat(listing))
}

/// POST /expenses
pub async fn expense_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<CreateExpense>, JsonRejection>,
) -> ApiResult<ExpenseRecord> {
    let expense = state.expenses().create(auth.user_id, json_body(body)?).await?;
    Ok(ApiResponse::keyed("expense", expense).created())
}

/// PUT /expenses/:id
pub async fn expense_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateExpense>, JsonRejection>,
) -> ApiResult<ExpenseRecord> {
    let expense_id = parse_id(&id, "Expense not found")?;
    let input = json_body(body)?;
    let expense = state.expenses().update(expense_id, auth.user_id, input).await?;
    Ok(ApiResponse::keyed("expense", expense))
}

/// DELETE /expenses/:id
pub async fn expense_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let expense_id = parse_id(&id, "Expense not found")?;
    state.expenses().delete(expense_id, auth.user_id).await?;
    Ok(ApiResponse::message("Expense deleted successfully"))
}
