use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, INVALID_CREDENTIALS};
use crate::middleware::extract::SessionSlot;
use crate::state::AppState;

/// Identity resolved from the bearer token, injected into request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

/// Bearer authentication gate for protected routes.
///
/// The token is verified before the store is touched. The session used for the
/// user lookup is handed on to the handler. A token whose subject no
/// longer exists as a user is rejected the same way as a forged one.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = {
        let token = extract_bearer(request.headers())?;
        state.tokens.resolve_token(token)?
    };

    let mut session = state.gateway.session().await?;
    let user = session
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token subject '{}' does not match any user", username);
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    // The handler's DbSession picks this up instead of opening a second one
    request.extensions_mut().insert(SessionSlot::new(session));

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ApiError::unauthorized("Not authenticated")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(&headers_with("bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&headers_with("Basic dXNlcjpwdw==")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
        assert!(extract_bearer(&headers_with("Bearer")).is_err());
    }
}
