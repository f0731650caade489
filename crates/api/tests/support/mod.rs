#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::header::AUTHORIZATION;
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use consinco_api::{router, AppContext, BasicCredentials, EnvironmentRegistry};
use consinco_core::ErpGateway;
use consinco_domain::{Environment, Result, TokenStatus};
use serde_json::Value;

pub const USERNAME: &str = "api";
pub const PASSWORD: &str = "s3cret";

/// Gateway returning canned answers and counting calls.
pub struct StubGateway {
    pub sql: Result<Value>,
    pub activation: Result<bool>,
    pub status: TokenStatus,
    pub calls: AtomicUsize,
    pub last_sql: Mutex<Option<String>>,
}

impl StubGateway {
    pub fn new(sql: Result<Value>) -> Self {
        Self {
            sql,
            activation: Ok(true),
            status: TokenStatus::evaluate(None, chrono::Utc::now()),
            calls: AtomicUsize::new(0),
            last_sql: Mutex::new(None),
        }
    }

    pub fn with_activation(mut self, activation: Result<bool>) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_status(mut self, status: TokenStatus) -> Self {
        self.status = status;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErpGateway for StubGateway {
    async fn run_sql(&self, sql: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sql.lock().unwrap() = Some(sql.to_string());
        self.sql.clone()
    }

    async fn activate_category(&self, _code: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.activation.clone()
    }

    fn token_status(&self) -> TokenStatus {
        self.status.clone()
    }
}

/// Router with only `prod` configured.
pub fn app(gateway: Arc<StubGateway>) -> Router {
    app_with(EnvironmentRegistry::new(Environment::Prod).with_gateway(Environment::Prod, gateway), false)
}

pub fn app_with(registry: EnvironmentRegistry, health_requires_auth: bool) -> Router {
    let context = AppContext::with_registry(
        registry,
        BasicCredentials::new(USERNAME, PASSWORD),
        health_requires_auth,
    );
    router(Arc::new(context))
}

pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    authed_request(method, uri, body, Some(basic(USERNAME, PASSWORD)))
}

pub fn authed_request(
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorization: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(authorization) = authorization {
        builder = builder.header(AUTHORIZATION, authorization);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
