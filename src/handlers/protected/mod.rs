// handlers/protected/mod.rs - Endpoints behind session_auth_middleware
//
// Every handler here receives the caller as `Extension<AuthUser>`.
pub mod analytics;
pub mod auth;
pub mod expenses;
pub mod goals;
pub mod groups;
pub mod users;
