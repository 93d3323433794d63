mod jwt;
mod middleware;

pub use jwt::{issue_session_token, verify_session_token, Claims};
pub use middleware::{auth_middleware, AuthUser};
