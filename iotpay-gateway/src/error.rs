//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iotpay_executor::ExecutorError;
use iotpay_gate::PaymentDetails;
use serde_json::json;

/// Errors that can occur during gateway startup or request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// An error propagated from the device hub, including unknown devices.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// The action is priced and no payment proof was presented.
    #[error("payment required")]
    PaymentRequired(Box<PaymentDetails>),

    /// A payment proof was presented but is malformed or unverifiable.
    #[error("invalid payment proof: {0}")]
    InvalidProof(String),

    /// The request body is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An unexpected fault while building a response.
    #[error("internal error: {0}")]
    Internal(String),

    /// An environment variable holds an unusable value.
    #[error("invalid configuration for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Executor(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            GatewayError::PaymentRequired(details) => {
                let body = json!({"error": "Payment Required", "paymentDetails": details});
                return (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response();
            }
            GatewayError::InvalidProof(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Executor(_)
            | GatewayError::Internal(_)
            | GatewayError::InvalidConfig { .. } => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
