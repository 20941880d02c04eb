pub mod auth_service;
pub mod category_service;
pub mod expense_service;
pub mod goal_service;
pub mod group_service;
pub mod guard;
pub mod user_service;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::error::FilterError;

pub use auth_service::{AuthService, LoginInput, SignupInput};
pub use expense_service::{CreateExpense, ExpenseListing, ExpenseService, UpdateExpense};
pub use goal_service::{Contribution, CreateGoal, GoalService, UpdateGoal};
pub use group_service::{AddMemberInput, GroupInput, GroupService};
pub use user_service::{UpdateProfile, UserService};

/// Failure of a service operation, with a client-facing message where one applies.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Postgres SQLSTATE for unique_violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Postgres SQLSTATE for numeric_value_out_of_range.
pub(crate) fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("22003"))
}

/// Money columns are `NUMERIC(14, 2)`: at most two decimal places and below 10^12.
pub(crate) fn money(amount: Decimal, non_positive: &str) -> ServiceResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::validation(non_positive));
    }
    if amount.normalize().scale() > 2 {
        return Err(ServiceError::validation("Amounts may have at most 2 decimal places"));
    }
    if amount >= Decimal::from(MONEY_LIMIT) {
        return Err(ServiceError::validation("Amount is too large"));
    }
    Ok(amount)
}

const MONEY_LIMIT: i64 = 1_000_000_000_000;
