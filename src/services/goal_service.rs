use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::guard::check_owner;
use super::{is_numeric_overflow, money, ServiceError, ServiceResult};
use crate::database::models::{Goal, GoalView};
use crate::types::{explicit_null, optional_amount, parse_date};

const GOAL_COLUMNS: &str =
    "id, user_id, name, target_amount, current_amount, deadline, description, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoal {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub target_amount: Option<Decimal>,
    pub deadline: Option<String>,
    pub description: Option<String>,
}

/// `deadline: null` clears the deadline; an absent key leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoal {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub target_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub deadline: Option<Option<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contribution {
    #[serde(default, deserialize_with = "optional_amount")]
    pub amount: Option<Decimal>,
}

#[derive(Clone)]
pub struct GoalService {
    pool: PgPool,
}

impl GoalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest first.
    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<GoalView>> {
        let sql = format!("SELECT {} FROM goals WHERE user_id = $1 ORDER BY created_at DESC, id DESC", GOAL_COLUMNS);
        let goals = sqlx::query_as::<_, Goal>(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(goals.into_iter().map(GoalView::from).collect())
    }

    pub async fn create(&self, user_id: Uuid, input: CreateGoal) -> ServiceResult<GoalView> {
        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let (Some(name), Some(target_amount)) = (name, input.target_amount) else {
            return Err(ServiceError::validation("Name and target amount are required"));
        };
        positive_target(target_amount)?;
        let deadline = optional_deadline(input.deadline.as_deref())?;

        let sql = format!(
            "INSERT INTO goals (user_id, name, target_amount, current_amount, deadline, description) \
             VALUES ($1, $2, $3, 0, $4, $5) RETURNING {}",
            GOAL_COLUMNS
        );
        let goal = sqlx::query_as::<_, Goal>(&sql)
            .bind(user_id)
            .bind(name)
            .bind(target_amount)
            .bind(deadline)
            .bind(input.description.unwrap_or_default())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Created goal {} for user {}", goal.id, user_id);
        Ok(goal.into())
    }

    pub async fn get(&self, goal_id: Uuid, user_id: Uuid) -> ServiceResult<GoalView> {
        let goal = self.find(goal_id).await?;
        check_owner(goal.as_ref(), user_id).require("Goal not found", "Unauthorized to access this goal")?;
        goal.map(GoalView::from)
            .ok_or_else(|| ServiceError::NotFound("Goal not found".into()))
    }

    pub async fn update(&self, goal_id: Uuid, user_id: Uuid, input: UpdateGoal) -> ServiceResult<GoalView> {
        let existing = self.find(goal_id).await?;
        check_owner(existing.as_ref(), user_id).require("Goal not found", "Unauthorized to update this goal")?;

        if let Some(target) = input.target_amount {
            positive_target(target)?;
        }
        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let (deadline_set, deadline) = match &input.deadline {
            None => (false, None),
            Some(value) => (true, optional_deadline(value.as_deref())?),
        };

        let sql = format!(
            "UPDATE goals SET \
                name = COALESCE($3, name), \
                target_amount = COALESCE($4, target_amount), \
                deadline = CASE WHEN $5 THEN $6 ELSE deadline END, \
                description = COALESCE($7, description), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            GOAL_COLUMNS
        );
        let goal = sqlx::query_as::<_, Goal>(&sql)
            .bind(goal_id)
            .bind(user_id)
            .bind(name)
            .bind(input.target_amount)
            .bind(deadline_set)
            .bind(deadline)
            .bind(input.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Goal not found".into()))?;

        tracing::info!("Updated goal {}", goal_id);
        Ok(goal.into())
    }

    pub async fn delete(&self, goal_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let existing = self.find(goal_id).await?;
        check_owner(existing.as_ref(), user_id).require("Goal not found", "Unauthorized to delete this goal")?;

        sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Deleted goal {}", goal_id);
        Ok(())
    }

    /// Adds to `current_amount` in a single statement. Over-funding is allowed.
    pub async fn contribute(&self, goal_id: Uuid, user_id: Uuid, input: Contribution) -> ServiceResult<GoalView> {
        let amount = match input.amount {
            Some(a) => money(a, "Valid contribution amount is required")?,
            None => return Err(ServiceError::validation("Valid contribution amount is required")),
        };

        let existing = self.find(goal_id).await?;
        check_owner(existing.as_ref(), user_id)
            .require("Goal not found", "Unauthorized to contribute to this goal")?;

        let sql = format!(
            "UPDATE goals SET current_amount = current_amount + $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            GOAL_COLUMNS
        );
        let goal = sqlx::query_as::<_, Goal>(&sql)
            .bind(goal_id)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_numeric_overflow(&e) {
                    ServiceError::validation("Contribution would exceed the maximum goal balance")
                } else {
                    ServiceError::from(e)
                }
            })?
            .ok_or_else(|| ServiceError::NotFound("Goal not found".into()))?;

        tracing::info!("Contributed {} to goal {}", amount, goal_id);
        Ok(goal.into())
    }

    async fn find(&self, goal_id: Uuid) -> ServiceResult<Option<Goal>> {
        let sql = format!("SELECT {} FROM goals WHERE id = $1", GOAL_COLUMNS);
        let goal = sqlx::query_as::<_, Goal>(&sql)
            .bind(goal_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(goal)
    }
}

fn positive_target(target: Decimal) -> ServiceResult<()> {
    money(target, "Target amount must be positive").map(|_| ())
}

fn optional_deadline(raw: Option<&str>) -> ServiceResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| ServiceError::validation("Invalid deadline")),
    }
}
