use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::guard::Owned;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Percentage saved, capped at 100. Zero when the target is not positive.
    pub fn progress(&self) -> f64 {
        capped_percentage(self.current_amount, self.target_amount)
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

impl Owned for Goal {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// `part / whole * 100` clamped to [0, 100]; 0 on a non-positive denominator.
pub fn capped_percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    let pct = (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);
    pct.clamp(0.0, 100.0)
}

/// Goal as returned by the API, with its computed progress.
#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: f64,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        let progress = goal.progress();
        Self { goal, progress }
    }
}
