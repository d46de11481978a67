use axum::{extract::State, Json};

use crate::api::{LoginForm, Token};
use crate::auth::verify_password;
use crate::error::ApiError;
use crate::middleware::{ApiForm, DbSession};
use crate::state::AppState;

/// POST /token - exchange username and password for a bearer token
///
/// Takes an `application/x-www-form-urlencoded` body (`username`, `password`,
/// optional `grant_type=password`). An unknown user and a wrong password get
/// the same 401 so callers cannot tell which usernames exist.
pub async fn token(
    State(state): State<AppState>,
    mut session: DbSession,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    form.validate()?;

    let user = match session.find_user_by_username(&form.username).await? {
        Some(user) if verify_password(&form.password, &user.hashed_password) => user,
        _ => {
            tracing::warn!("Failed login for '{}'", form.username);
            return Err(ApiError::unauthorized("Incorrect username or password"));
        }
    };

    let access_token = state.tokens.issue_token(&user.username)?;

    tracing::info!("Issued token for '{}'", user.username);
    Ok(Json(Token::bearer(access_token)))
}
