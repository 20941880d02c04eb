use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{is_unique_violation, ServiceError, ServiceResult};
use crate::database::models::User;
use crate::types::UserRole;

pub(crate) const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, created_at, updated_at";

/// Only `full_name` and `email` are mutable through the profile endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none()
    }

    /// Trims provided fields; a field that is present but blank is rejected.
    fn normalized(self) -> ServiceResult<Self> {
        let full_name = non_blank(self.full_name, "Full name cannot be empty")?;
        let email = non_blank(self.email, "Email cannot be empty")?;
        Ok(Self { full_name, email })
    }
}

fn non_blank(value: Option<String>, message: &str) -> ServiceResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        Some("") => Err(ServiceError::validation(message)),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(user_id).fetch_optional(&self.pool).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?;
        Ok(user)
    }

    /// New accounts always get the `user` role.
    pub async fn create(&self, full_name: &str, email: &str, password_hash: &str) -> ServiceResult<User> {
        let sql = format!(
            "INSERT INTO users (full_name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(full_name)
            .bind(email)
            .bind(password_hash)
            .bind(UserRole::User.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::Conflict("User with this email already exists".into())
                } else {
                    ServiceError::from(e)
                }
            })?;
        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    /// Self or an account admin may read a profile.
    pub async fn get_profile(&self, requester: Uuid, role: UserRole, target: Uuid) -> ServiceResult<User> {
        if !may_access(requester, role, target) {
            return Err(ServiceError::Forbidden("Forbidden: Cannot access other user data".into()));
        }
        self.find_by_id(target)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        requester: Uuid,
        role: UserRole,
        target: Uuid,
        input: UpdateProfile,
    ) -> ServiceResult<User> {
        if !may_access(requester, role, target) {
            return Err(ServiceError::Forbidden("Forbidden: Cannot update other user data".into()));
        }
        if input.is_empty() {
            return Err(ServiceError::validation("No data provided for update"));
        }
        let input = input.normalized()?;
        if self.find_by_id(target).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".into()));
        }

        let email = input.email.as_deref();
        if let Some(email) = email {
            let taken: Option<Uuid> = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(target)
                .fetch_optional(&self.pool)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::Conflict("Email already in use".into()));
            }
        }

        let sql = format!(
            "UPDATE users SET full_name = COALESCE($2, full_name), email = COALESCE($3, email), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(target)
            .bind(input.full_name.as_deref())
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::Conflict("Email already in use".into())
                } else {
                    ServiceError::from(e)
                }
            })?;

        tracing::info!("Updated profile of user {}", target);
        Ok(user)
    }
}

fn may_access(requester: Uuid, role: UserRole, target: Uuid) -> bool {
    requester == target || role == UserRole::Admin
}
