use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::guard::Owned;

/// Expense joined with its category. Serializes with the category as a name string.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    #[serde(skip)]
    pub category_id: Uuid,
    #[serde(rename = "category")]
    pub category_name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Minimal projection used for ownership checks before a write.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseOwner {
    pub id: Uuid,
    pub user_id: Uuid,
}

impl Owned for ExpenseOwner {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for ExpenseRecord {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
