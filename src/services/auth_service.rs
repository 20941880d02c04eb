use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, UserService};
use crate::auth::{self, hash_password, verify_password};
use crate::config::SecurityConfig;
use crate::database::models::User;

/// Any `role` field a client sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, security: SecurityConfig) -> Self {
        Self { users: UserService::new(pool), security }
    }

    pub async fn signup(&self, input: SignupInput) -> ServiceResult<User> {
        let (Some(full_name), Some(email), Some(password)) = (
            non_blank(input.full_name.as_deref()),
            non_blank(input.email.as_deref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ServiceError::validation("Missing required fields"));
        };

        if self.users.find_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict("User with this email already exists".into()));
        }

        let password_hash = hash_password(password)?;
        self.users.create(full_name, email, &password_hash).await
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<User> {
        let (Some(email), Some(password)) = (
            non_blank(input.email.as_deref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ServiceError::validation("Missing email or password"));
        };

        let user = self
            .users
            .find_by_email(email)
            .await?
            .filter(User::has_password)
            .ok_or_else(|| ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()));
        }
        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }

    /// The account behind a still-valid token; gone accounts are unauthenticated.
    pub async fn me(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("Unauthorized".into()))
    }

    pub fn issue_token(&self, user: &User) -> ServiceResult<String> {
        Ok(auth::generate_token(&self.security, user.id, user.role())?)
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_ignores_client_role() {
        let body: SignupInput =
            serde_json::from_str(r#"{"full_name": "Ana", "email": "ana@example.com", "password": "pw", "role": "admin"}"#)
                .unwrap();
        assert_eq!(body.full_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" a@b.c ")), Some("a@b.c"));
        assert_eq!(non_blank(None), None);
    }
}
