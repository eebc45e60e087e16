//! Axum route handlers for the iotpay gateway API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use iotpay_core::{alias_from_id, DeviceKey};
use iotpay_executor::{ActionRequest, ActionResult, HubHandle};
use iotpay_gate::{GateDecision, PaymentGate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::GatewayConfig,
    error::GatewayError,
    manifest::{device_manifest, global_manifest},
};

// ── Shared state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub gate: Arc<PaymentGate>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(hub: HubHandle, gate: PaymentGate, config: GatewayConfig) -> Self {
        Self {
            hub,
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }
}

// ── Request / response types ──────────────────────────────────────────────────

/// `POST /devices/{alias}/job` body: an action id plus free-form parameters,
/// given either inline or under a nested `params` object.
#[derive(Debug, Deserialize)]
pub struct JobBody {
    pub action: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl JobBody {
    /// Inline and nested parameters merged; nested keys win.
    #[must_use]
    pub fn into_parts(mut self) -> (String, Map<String, Value>) {
        if let Some(Value::Object(nested)) = self.params.remove("params") {
            self.params.extend(nested);
        }
        (self.action, self.params)
    }
}

/// `GET /resolve/{name}` response.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub url: String,
    pub payment_address: String,
    pub device_id: String,
    pub device_name: String,
    pub ens_domain: String,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over a running device hub.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(list_status))
        .route("/status/{device_id}", get(device_status))
        .route("/ai-manifest", get(ai_manifest))
        .route("/resolve/{name}", get(resolve))
        .route("/devices/{alias}/ai-manifest", get(device_ai_manifest))
        .route("/devices/{alias}/status", get(device_status_by_alias))
        .route("/devices/{alias}/job", post(device_job))
        .route("/v1/devices/{device_id}/unlock", post(unlock_device))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /`: banner.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "iotpay gateway is running; see /ai-manifest"}))
}

/// `GET /health`: liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /status`: one summary row per device.
///
/// # Errors
/// Returns [`GatewayError::Executor`] if the device hub has stopped.
pub async fn list_status(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.hub.summaries().await?))
}

/// `GET /status/{device_id}`: full telemetry for one device.
///
/// # Errors
/// Returns a not-found [`GatewayError::Executor`] for an unknown id.
pub async fn device_status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.hub.detail(DeviceKey::Id(device_id)).await?))
}

/// `GET /devices/{alias}/status`: same document as `/status/{device_id}`.
///
/// # Errors
/// Returns a not-found [`GatewayError::Executor`] for an unknown alias.
pub async fn device_status_by_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.hub.detail(DeviceKey::Alias(alias)).await?))
}

/// `GET /ai-manifest`: API-wide capabilities, chain block and device list.
///
/// # Errors
/// Returns [`GatewayError::Executor`] if the device hub has stopped.
pub async fn ai_manifest(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let profiles = state.hub.profiles().await?;
    let body = serde_json::to_value(global_manifest(state.gate.chain(), profiles))
        .map_err(|e| GatewayError::Internal(format!("manifest serialization failed: {e}")))?;
    Ok(Json(body))
}

/// `GET /devices/{alias}/ai-manifest`: the device's current capabilities.
///
/// # Errors
/// Returns a not-found [`GatewayError::Executor`] for an unknown alias.
pub async fn device_ai_manifest(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let profile = state.hub.profile(DeviceKey::Alias(alias)).await?;
    let body = serde_json::to_value(device_manifest(state.gate.chain(), profile))
        .map_err(|e| GatewayError::Internal(format!("manifest serialization failed: {e}")))?;
    Ok(Json(body))
}

/// `GET /resolve/{name}`: symbolic domain to device and payment address.
///
/// # Errors
/// Returns a not-found [`GatewayError::Executor`] for an unknown domain.
pub async fn resolve(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let profile = state.hub.profile(DeviceKey::Domain(name)).await?;
    Ok(Json(ResolveResponse {
        url: state.config.base_url.clone(),
        payment_address: state.gate.chain().recipient.clone(),
        device_name: alias_from_id(&profile.id),
        device_id: profile.id,
        ens_domain: profile.ens_domain,
    }))
}

/// `POST /v1/devices/{device_id}/unlock`: paid unlock addressed by id.
///
/// # Errors
/// 404 for an unknown device, 402 without a proof, 401 for a bad proof.
pub async fn unlock_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ActionResult>, GatewayError> {
    run_gated(&state, DeviceKey::Id(device_id), "unlock".to_owned(), Map::new(), &headers).await
}

/// `POST /devices/{alias}/job`: run any device action through the gate.
///
/// # Errors
/// 404 for an unknown device, 402 without a proof on a priced action,
/// 401 for a bad proof.
pub async fn device_job(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    headers: HeaderMap,
    Json(body): Json<JobBody>,
) -> Result<Json<ActionResult>, GatewayError> {
    let (action, params) = body.into_parts();
    if action.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("action must not be empty".to_owned()));
    }
    run_gated(&state, DeviceKey::Alias(alias), action, params, &headers).await
}

// ── Gating helpers ────────────────────────────────────────────────────────────

async fn run_gated(
    state: &AppState,
    key: DeviceKey,
    action: String,
    params: Map<String, Value>,
    headers: &HeaderMap,
) -> Result<Json<ActionResult>, GatewayError> {
    let profile = state.hub.profile(key).await?;
    let decision = state.gate.evaluate(bearer_proof(headers), profile.device_type, &action).await;
    let proof = match decision {
        GateDecision::Admitted(proof) => proof,
        GateDecision::Challenge(details) => return Err(GatewayError::PaymentRequired(details)),
        GateDecision::Rejected(reason) => return Err(GatewayError::InvalidProof(reason)),
    };
    let request = ActionRequest::new(action, proof).with_params(params);
    let result = state.hub.execute(DeviceKey::Id(profile.id), request).await?;
    Ok(Json(result))
}

/// Proof from `Authorization: Bearer <proof>`; the scheme is matched
/// case-insensitively and a bare value is accepted too.
fn bearer_proof(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let proof = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!proof.is_empty()).then_some(proof)
}
