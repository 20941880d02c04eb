// handlers/public/mod.rs - Endpoints reachable without a session
pub mod auth;
pub mod health;

pub use health::{health, root};
