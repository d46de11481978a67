use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use crate::database::Session;
use crate::error::ApiError;
use crate::state::AppState;

/// Store session opened for the lifetime of one request.
///
/// Protected routes reuse the session `require_user` opened and parked in the
/// request extensions; public routes open their own. Either way the underlying
/// connection goes back to the pool when the request finishes.
pub struct DbSession(pub Box<dyn Session>);

/// Session handed from the auth gate to the handler.
#[derive(Clone)]
pub struct SessionSlot(Arc<Mutex<Option<Box<dyn Session>>>>);

impl SessionSlot {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self(Arc::new(Mutex::new(Some(session))))
    }

    /// Takes the session out; later calls get `None`.
    pub fn take(&self) -> Option<Box<dyn Session>> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.remove::<SessionSlot>().and_then(|slot| slot.take()) {
            return Ok(Self(session));
        }

        let session = state.gateway.session().await?;
        Ok(Self(session))
    }
}

impl Deref for DbSession {
    type Target = dyn Session;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

/// `Json` whose rejections render as `{"detail": ...}`
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Form` whose rejections render as `{"detail": ...}`
pub struct ApiForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Path` whose rejections render as `{"detail": ...}`
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
