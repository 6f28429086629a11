//! Authentication: token issuance and verification, the log-in and
//! registration endpoints, and the middleware that guards the API routes.

mod log_in;
mod middleware;
mod register;
mod token;

pub use log_in::{AuthResponse, LogInData, UserProfile, post_log_in};
pub use middleware::{AuthState, auth_guard};
pub use register::{RegisterData, register_user};
pub use token::{TOKEN_DURATION, TokenKeys, issue_token, verify_token};
