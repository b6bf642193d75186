use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::Environment;
use crate::llm_client::fence::ParseError;

/// Failure reported by an external provider (embedding model or generative model).
///
/// Never retried inside the engine. Callers decide their own retry policy.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} rejected the credentials (status {status})")]
    Auth { service: &'static str, status: u16 },

    #[error("{service} rate limited the request")]
    RateLimited { service: &'static str },

    #[error("{service} did not answer before the timeout")]
    Timeout { service: &'static str },

    #[error("{service} network error: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service} API error (status {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} returned an unusable response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    /// Classifies a transport-level reqwest failure.
    pub fn from_transport(service: &'static str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UpstreamError::Timeout { service }
        } else if error.is_decode() {
            UpstreamError::InvalidResponse {
                service,
                message: error.to_string(),
            }
        } else {
            UpstreamError::Network {
                service,
                message: error.to_string(),
            }
        }
    }

    /// Classifies a non-success HTTP status returned by a provider.
    pub fn from_status(service: &'static str, status: u16, message: String) -> Self {
        match status {
            401 | 403 => UpstreamError::Auth { service, status },
            429 => UpstreamError::RateLimited { service },
            408 | 504 => UpstreamError::Timeout { service },
            _ => UpstreamError::Api {
                service,
                status,
                message,
            },
        }
    }
}

/// Application-level error type shared by the engine and the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        AppError::Parse(e.to_string())
    }
}

impl AppError {
    /// Attaches the deployment environment so the response knows whether
    /// diagnostic detail may be exposed.
    pub fn for_env(self, environment: Environment) -> ApiError {
        ApiError {
            error: self,
            expose_details: environment != Environment::Production,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Upstream(UpstreamError::RateLimited { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_RATE_LIMITED")
            }
            AppError::Upstream(UpstreamError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT")
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Parse(_) => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show any caller. Server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Upstream(_) | AppError::Parse(_) => {
                "The match computation failed. Please try again later.".to_string()
            }
            AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) => {}
            AppError::Upstream(e) => tracing::error!("Upstream error: {e}"),
            AppError::Parse(msg) => tracing::error!("Model output parse error: {msg}"),
            AppError::Config(msg) => tracing::error!("Configuration error: {msg}"),
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }
    }
}

/// An `AppError` bound to a response policy. Returned by route handlers.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    expose_details: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.error.log();
        let (status, code) = self.error.status_and_code();

        let mut body = json!({
            "error": {
                "code": code,
                "message": self.error.public_message()
            }
        });
        if self.expose_details {
            body["error"]["detail"] = json!(self.error.to_string());
        }

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError {
            error: self,
            expose_details: false,
        }
        .into_response()
    }
}
