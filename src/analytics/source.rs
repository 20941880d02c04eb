use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::aggregate::{GroupLedger, LedgerEntry};
use crate::database::models::{ExpenseRecord, Goal};
use crate::database::DatabaseError;
use crate::filter::filter::EXPENSE_COLUMNS;

/// Read access the analytics service needs. Every method is scoped to one user.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// The user's expenses with `start <= date <= end`; a `None` bound is open.
    async fn expenses_between(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ExpenseRecord>, DatabaseError>;

    async fn largest_expenses(&self, user_id: Uuid, limit: u32) -> Result<Vec<ExpenseRecord>, DatabaseError>;

    /// Groups the user is a member of, with all expenses attributed to each.
    async fn member_groups(&self, user_id: Uuid) -> Result<Vec<GroupLedger>, DatabaseError>;

    /// Newest first.
    async fn goals(&self, user_id: Uuid) -> Result<Vec<Goal>, DatabaseError>;
}

#[derive(Clone)]
pub struct PgAnalyticsSource {
    pool: PgPool,
}

impl PgAnalyticsSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSource for PgAnalyticsSource {
    async fn expenses_between(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ExpenseRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM expenses e JOIN categories c ON c.id = e.category_id \
             WHERE e.user_id = $1 \
               AND ($2::date IS NULL OR e.date >= $2) \
               AND ($3::date IS NULL OR e.date <= $3) \
             ORDER BY e.date, e.id",
            EXPENSE_COLUMNS
        );
        let rows = sqlx::query_as::<_, ExpenseRecord>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn largest_expenses(&self, user_id: Uuid, limit: u32) -> Result<Vec<ExpenseRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM expenses e JOIN categories c ON c.id = e.category_id \
             WHERE e.user_id = $1 ORDER BY e.amount DESC, e.id LIMIT $2",
            EXPENSE_COLUMNS
        );
        let rows = sqlx::query_as::<_, ExpenseRecord>(&sql)
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn member_groups(&self, user_id: Uuid) -> Result<Vec<GroupLedger>, DatabaseError> {
        let groups = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT g.id, g.name FROM group_members gm \
             JOIN expense_groups g ON g.id = gm.group_id \
             WHERE gm.user_id = $1 ORDER BY gm.joined_at, g.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if groups.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = groups.iter().map(|(id, _)| *id).collect();

        let entries = sqlx::query_as::<_, (Uuid, Uuid, Decimal)>(
            "SELECT e.group_id, e.user_id, e.amount FROM expenses e WHERE e.group_id = ANY($1)",
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut by_group: HashMap<Uuid, Vec<LedgerEntry>> = HashMap::new();
        for (group_id, user_id, amount) in entries {
            by_group.entry(group_id).or_default().push(LedgerEntry { user_id, amount });
        }

        Ok(groups
            .into_iter()
            .map(|(group_id, group_name)| GroupLedger {
                entries: by_group.remove(&group_id).unwrap_or_default(),
                group_id,
                group_name,
            })
            .collect())
    }

    async fn goals(&self, user_id: Uuid) -> Result<Vec<Goal>, DatabaseError> {
        let rows = sqlx::query_as::<_, Goal>(
            "SELECT id, user_id, name, target_amount, current_amount, deadline, description, created_at, updated_at \
             FROM goals WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
