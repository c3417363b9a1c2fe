//! API error types and HTTP response conversion
//!
//! Engine errors are mapped onto status codes: bad input state is the
//! caller's fault (422), everything else the engine raises is a server-side
//! failure (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use stepflow_checkpoint::CheckpointError;
use stepflow_core::GraphError;
use thiserror::Error;

/// API error response structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl From<&ApiError> for ApiErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self::new(err.error_type(), err.to_string(), err.code())
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown workflow or thread
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Workflow exists in principle but is not configured
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Engine failure
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Graph(GraphError::State { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Graph(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Checkpoint(CheckpointError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Checkpoint(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Graph(err) => match err {
                GraphError::Configuration(_) => "CONFIGURATION_ERROR",
                GraphError::Routing { .. } => "ROUTING_ERROR",
                GraphError::StepLimitExceeded { .. } => "STEP_LIMIT_EXCEEDED",
                GraphError::Checkpoint(_) => "CHECKPOINT_ERROR",
                GraphError::State { .. } => "STATE_ERROR",
                GraphError::Serialization(_) => "SERIALIZATION_ERROR",
            },
            ApiError::Checkpoint(_) => "CHECKPOINT_ERROR",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Unavailable(_) => "Unavailable",
            ApiError::InternalError(_) => "InternalError",
            ApiError::Graph(_) => "GraphError",
            ApiError::Checkpoint(_) => "CheckpointError",
        }
    }

    pub fn workflow_not_found(name: &str) -> Self {
        ApiError::NotFound(format!("workflow '{name}'"))
    }

    pub fn thread_not_found(thread_id: &str) -> Self {
        ApiError::NotFound(format!("thread '{thread_id}'"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorResponse::from(&self);

        if status.is_server_error() {
            tracing::error!(code = %body.code, "API error: {}", body.message);
        } else {
            tracing::debug!(code = %body.code, "API error: {}", body.message);
        }

        (status, Json(body)).into_response()
    }
}
