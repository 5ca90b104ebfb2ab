//! Lightweight classroom sign-in.
//!
//! Students identify with a display name only; the name (and a generated
//! drill-session id) travel in cookies. There are no passwords or accounts
//! to manage - progress is keyed by the derived user id.

pub mod handlers;
pub mod middleware;

pub use handlers::*;
pub use middleware::{user_id_from_name, AuthContext, OptionalAuth, SESSION_COOKIE_NAME, USER_COOKIE_NAME};
