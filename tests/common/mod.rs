//! In-process stand-in for the settings service.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use settings_admin::api::auth::AuthClient;
use settings_admin::api::build_http;
use settings_admin::api::client::SettingsClient;
use settings_admin::api::types::{CreateSettingsRequest, DeleteSettingsRequest, Setting};
use settings_admin::auth::AuthToken;
use settings_admin::codec::ValueType;

pub const TOKEN: &str = "test-admin-token";

#[derive(Default)]
struct Service {
    settings: BTreeMap<String, Setting>,
    tick: i64,
    /// When set, writes fail with a bare 500 and no message body.
    bare_write_failures: bool,
}

impl Service {
    fn stamp(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::minutes(self.tick)
    }
}

type Shared = Arc<Mutex<Service>>;

pub struct MockService {
    pub addr: SocketAddr,
    state: Shared,
}

impl MockService {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let api = Router::new()
            .route(
                "/settings",
                get(list_settings)
                    .post(create_setting)
                    .put(update_setting)
                    .delete(delete_settings),
            )
            .route("/settings/{key}", get(get_setting))
            .route("/auth/validate-token", post(validate_token))
            .route("/health_check", get(health))
            .with_state(state.clone());
        let app = Router::new().nest("/api/v1", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn client(&self, token: Option<&str>) -> SettingsClient {
        let http = build_http(Duration::from_secs(5)).unwrap();
        SettingsClient::new(http, self.base_url(), token.and_then(AuthToken::new))
    }

    pub fn auth_client(&self) -> AuthClient {
        AuthClient::new(build_http(Duration::from_secs(5)).unwrap(), self.base_url())
    }

    pub fn seed(&self, key: &str, value_type: ValueType, value: &str) {
        let mut svc = self.state.lock().unwrap();
        let at = svc.stamp();
        svc.settings.insert(
            key.to_string(),
            Setting {
                key: key.to_string(),
                value_type,
                value: value.to_string(),
                updated_at: Some(at),
                created_at: Some(at),
            },
        );
    }

    pub fn stored_value(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().settings.get(key).map(|s| s.value.clone())
    }

    pub fn fail_writes_without_message(&self) {
        self.state.lock().unwrap().bare_write_failures = true;
    }
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(TOKEN) => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" }))).into_response()),
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    prefix: Option<String>,
}

async fn list_settings(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let svc = state.lock().unwrap();
    let prefix = query.prefix.unwrap_or_default();
    let items: Vec<&Setting> = svc.settings.values().filter(|s| s.key.starts_with(&prefix)).collect();
    Json(items).into_response()
}

async fn get_setting(State(state): State<Shared>, headers: HeaderMap, Path(key): Path<String>) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    match state.lock().unwrap().settings.get(&key) {
        Some(setting) => Json(setting).into_response(),
        None => message(StatusCode::NOT_FOUND, &format!("Settings with key '{key}' not found")),
    }
}

fn type_error(value_type: ValueType, value: &str) -> Option<String> {
    let ok = match value_type {
        ValueType::Str => true,
        ValueType::Int => value.parse::<i64>().is_ok(),
        ValueType::Float => value.parse::<f64>().is_ok(),
        ValueType::Bool => matches!(value, "true" | "false"),
        ValueType::Json => serde_json::from_str::<Value>(value).is_ok(),
    };
    (!ok).then(|| format!("Value '{value}' is not a valid {}", value_type.wire_name()))
}

async fn create_setting(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CreateSettingsRequest>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let mut svc = state.lock().unwrap();
    if svc.bare_write_failures {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if svc.settings.contains_key(&body.key) {
        return message(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Settings with key '{}' already exists", body.key),
        );
    }
    if let Some(err) = type_error(body.value_type, &body.value) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, &err);
    }
    let at = svc.stamp();
    svc.settings.insert(
        body.key.clone(),
        Setting {
            key: body.key,
            value_type: body.value_type,
            value: body.value,
            updated_at: Some(at),
            created_at: Some(at),
        },
    );
    message(StatusCode::CREATED, "Setting created")
}

#[derive(Deserialize)]
struct UpdateBody {
    key: String,
    value: String,
}

async fn update_setting(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<UpdateBody>) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let mut svc = state.lock().unwrap();
    if svc.bare_write_failures {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(value_type) = svc.settings.get(&body.key).map(|s| s.value_type) else {
        return message(StatusCode::NOT_FOUND, &format!("Settings with key '{}' not found", body.key));
    };
    if let Some(err) = type_error(value_type, &body.value) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, &err);
    }
    let at = svc.stamp();
    if let Some(setting) = svc.settings.get_mut(&body.key) {
        setting.value = body.value;
        setting.updated_at = Some(at);
    }
    message(StatusCode::OK, "Setting updated")
}

async fn delete_settings(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<DeleteSettingsRequest>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let mut svc = state.lock().unwrap();
    for key in &body.keys {
        svc.settings.remove(key);
    }
    message(StatusCode::OK, "Settings deleted")
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

async fn validate_token(Json(body): Json<TokenBody>) -> Response {
    if body.token == TOKEN {
        Json(json!({ "valid": true })).into_response()
    } else {
        message(StatusCode::UNAUTHORIZED, "Invalid token")
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
