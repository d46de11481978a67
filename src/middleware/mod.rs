pub mod auth;
pub mod extract;

pub use auth::{require_user, CurrentUser};
pub use extract::{ApiForm, ApiJson, ApiPath, DbSession, SessionSlot};
