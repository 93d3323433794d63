mod auth;
mod client;

pub use auth::SessionToken;
pub use client::{ApiClient, ApiError};
