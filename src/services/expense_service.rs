use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::guard::check_owner;
use super::{category_service, money, GroupService, ServiceError, ServiceResult};
use crate::config::FilterConfig;
use crate::database::models::{ExpenseOwner, ExpenseRecord};
use crate::database::QueryBuilder;
use crate::filter::{ExpenseFilter, ExpenseQuery, ExpenseQueryParams, Pagination};
use crate::types::{optional_amount, parse_date};

/// Body of `POST /expenses`. `categoryId` carries a category name on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    #[serde(rename = "categoryId")]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub group_id: Option<String>,
}

/// Body of `PUT /expenses/:id`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpense {
    #[serde(rename = "categoryId")]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseListing {
    pub expenses: Vec<ExpenseRecord>,
    pub pagination: Pagination,
}

const CHANGED_EXPENSE: &str = "SELECT i.id, i.user_id, i.group_id, i.category_id, c.name AS category_name, \
     i.amount, i.date, i.description, i.created_at \
     FROM changed i JOIN categories c ON c.id = i.category_id";

#[derive(Clone)]
pub struct ExpenseService {
    pool: PgPool,
    filter_config: FilterConfig,
}

impl ExpenseService {
    pub fn new(pool: PgPool, filter_config: FilterConfig) -> Self {
        Self { pool, filter_config }
    }

    pub async fn list(&self, user_id: Uuid, params: &ExpenseQueryParams) -> ServiceResult<ExpenseListing> {
        let query = ExpenseQuery::from_params(params, &self.filter_config)?;
        let builder = QueryBuilder::<ExpenseRecord>::new(ExpenseFilter::new(user_id, query));

        let expenses = builder.select_all(&self.pool).await?;
        let total = builder.count(&self.pool).await?;

        let q = builder.filter().query();
        let pagination = Pagination::new(q.page, q.limit, total.max(0) as u64);
        Ok(ExpenseListing { expenses, pagination })
    }

    pub async fn create(&self, user_id: Uuid, input: CreateExpense) -> ServiceResult<ExpenseRecord> {
        let category_name = input.category_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let date_raw = input.date.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let (Some(category_name), Some(amount), Some(date_raw)) = (category_name, input.amount, date_raw) else {
            return Err(ServiceError::validation("Missing required fields"));
        };
        validate_amount(amount)?;
        let date = parse_date(date_raw).ok_or_else(|| ServiceError::validation("Invalid date"))?;

        let group_id = match input.group_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let id = Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound("Group not found".into()))?;
                GroupService::new(self.pool.clone()).require_participant(id, user_id).await?;
                Some(id)
            }
        };

        let category = category_service::find_or_create(&self.pool, category_name).await?;
        let sql = format!(
            "WITH changed AS (\
                INSERT INTO expenses (user_id, category_id, amount, date, description, group_id) \
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING *) {}",
            CHANGED_EXPENSE
        );
        let expense = sqlx::query_as::<_, ExpenseRecord>(&sql)
            .bind(user_id)
            .bind(category.id)
            .bind(amount)
            .bind(date)
            .bind(input.description.unwrap_or_default())
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Created expense {} for user {}", expense.id, user_id);
        Ok(expense)
    }

    pub async fn update(&self, expense_id: Uuid, user_id: Uuid, input: UpdateExpense) -> ServiceResult<ExpenseRecord> {
        let existing = self.find_owner(expense_id).await?;
        check_owner(existing.as_ref(), user_id).require("Expense not found", "Unauthorized to update this expense")?;

        if let Some(amount) = input.amount {
            validate_amount(amount)?;
        }
        let date = match input.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(parse_date(raw).ok_or_else(|| ServiceError::validation("Invalid date"))?),
        };
        let category_id = match input.category_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(name) => Some(category_service::find_or_create(&self.pool, name).await?.id),
        };

        let sql = format!(
            "WITH changed AS (\
                UPDATE expenses SET \
                    amount = COALESCE($3, amount), \
                    category_id = COALESCE($4, category_id), \
                    date = COALESCE($5, date), \
                    description = COALESCE($6, description), \
                    updated_at = NOW() \
                WHERE id = $1 AND user_id = $2 RETURNING *) {}",
            CHANGED_EXPENSE
        );
        let expense = sqlx::query_as::<_, ExpenseRecord>(&sql)
            .bind(expense_id)
            .bind(user_id)
            .bind(input.amount)
            .bind(category_id)
            .bind(date)
            .bind(input.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Expense not found".into()))?;

        tracing::info!("Updated expense {}", expense_id);
        Ok(expense)
    }

    pub async fn delete(&self, expense_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let existing = self.find_owner(expense_id).await?;
        check_owner(existing.as_ref(), user_id).require("Expense not found", "Unauthorized to delete this expense")?;

        sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(expense_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Deleted expense {}", expense_id);
        Ok(())
    }

    async fn find_owner(&self, expense_id: Uuid) -> ServiceResult<Option<ExpenseOwner>> {
        let row = sqlx::query_as::<_, ExpenseOwner>("SELECT id, user_id FROM expenses WHERE id = $1")
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

fn validate_amount(amount: Decimal) -> ServiceResult<()> {
    money(amount, "Amount must be greater than 0").map(|_| ())
}
