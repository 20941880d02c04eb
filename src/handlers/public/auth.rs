// handlers/public/auth.rs - Session acquisition: signup, login, logout
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::{clear_session_cookie, session_cookie};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::ApiResponse;
use crate::server::AppState;
use crate::services::{LoginInput, SignupInput};

/// POST /auth/signup - create an account and start a session
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let auth = state.auth();
    let user = auth.signup(json_body(body)?).await?;
    tracing::info!("User {} signed up", user.id);

    let token = auth.issue_token(&user)?;
    session_response(ApiResponse::keyed("user", user).created(), session_cookie(&token, auth.security()))
}

/// POST /auth/login - verify credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let auth = state.auth();
    let user = auth.login(json_body(body)?).await?;
    tracing::info!("User {} logged in", user.id);

    let token = auth.issue_token(&user)?;
    session_response(ApiResponse::keyed("user", user), session_cookie(&token, auth.security()))
}

/// POST /auth/logout - expire the session cookie
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cookie = clear_session_cookie(&state.config.security);
    session_response(ApiResponse::message("Logged out successfully"), cookie)
}

fn session_response<T: serde::Serialize>(body: ApiResponse<T>, cookie: String) -> Result<Response, ApiError> {
    let cookie = HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!("Session cookie is not a valid header value: {}", e);
        ApiError::internal_server_error("Internal server error")
    })?;

    let mut response = body.into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}
