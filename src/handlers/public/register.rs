use axum::Json;

use crate::api::{UserCreate, UserRead};
use crate::auth::hash_password;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiJson, DbSession};

/// POST /register - create a user account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "pw1" }
/// ```
///
/// Returns the stored user without its password hash. A taken username is
/// rejected with 400 "Username already registered".
pub async fn register(
    mut session: DbSession,
    ApiJson(input): ApiJson<UserCreate>,
) -> Result<Json<UserRead>, ApiError> {
    input.validate()?;

    if session.find_user_by_username(&input.username).await?.is_some() {
        return Err(ApiError::conflict("Username already registered"));
    }

    let hashed_password = hash_password(&input.password)?;

    // The unique constraint still catches a concurrent registration of the same name
    let user = session
        .insert_user(NewUser {
            username: input.username,
            hashed_password,
        })
        .await?;

    tracing::info!("Registered user '{}' (ID: {})", user.username, user.id);
    Ok(Json(user.into()))
}
