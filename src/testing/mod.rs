use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::{DatabaseError, Gateway, MemoryGateway, Session};
use crate::state::AppState;

/// In-memory gateway that counts how many sessions were opened
#[derive(Default)]
pub struct CountingGateway {
    inner: MemoryGateway,
    opened: AtomicUsize,
}

impl CountingGateway {
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for CountingGateway {
    async fn session(&self) -> Result<Box<dyn Session>, DatabaseError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.inner.session().await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.inner.health_check().await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// Router over a fresh in-memory store, driven without a socket
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(Arc::new(MemoryGateway::new()))
    }

    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let state = AppState::from_config(&config, gateway);
        let router = app(state.clone(), &config);

        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }

    fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = Self::request(Method::GET, uri, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = Self::request(Method::DELETE, uri, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, payload: &Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json(Method::POST, uri, payload, token).await
    }

    pub async fn put_json(&self, uri: &str, payload: &Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json(Method::PUT, uri, payload, token).await
    }

    async fn send_json(&self, method: Method, uri: &str, payload: &Value, token: Option<&str>) -> (StatusCode, Value) {
        let request = Self::request(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> (StatusCode, Value) {
        let request = Self::request(Method::POST, uri, None)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&self, username: &str, password: &str) {
        let payload = serde_json::json!({ "username": username, "password": password });
        let (status, body) = self.post_json("/register", &payload, None).await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    }

    /// Registers the user and returns a bearer token for it
    pub async fn login(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;

        let form = format!("username={}&password={}", username, password);
        let (status, body) = self.post_form("/token", &form).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["access_token"]
            .as_str()
            .expect("access_token in login response")
            .to_string()
    }
}
