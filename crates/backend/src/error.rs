//! Unified error handling for the web handlers.
//!
//! Handlers return `ApiResult<T>` and use `?` freely; whatever escapes is
//! logged and turned into the matching error page.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::FormRejection;
use thiserror::Error;

use crate::templates::{BadRequestTemplate, NotFoundTemplate, ServerErrorTemplate};

/// Unified error type for web handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database connection pool error
    #[error("Database connection error")]
    ConnectionPool(#[source] diesel_async::pooled_connection::deadpool::PoolError),

    /// Query or other internal failure
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Page rendering failed
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Request body could not be read as the expected form
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Create a not found error with a custom message
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) | ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for ApiError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        ApiError::ConnectionPool(err)
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let page = match &self {
            ApiError::ConnectionPool(e) => {
                tracing::error!("Connection pool error: {:?}", e);
                ServerErrorTemplate { messages: vec![] }.render()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ServerErrorTemplate { messages: vec![] }.render()
            }
            ApiError::Template(e) => {
                tracing::error!("Template error: {:?}", e);
                ServerErrorTemplate { messages: vec![] }.render()
            }
            ApiError::NotFound(resource) => {
                tracing::debug!("{} not found", resource);
                NotFoundTemplate { messages: vec![] }.render()
            }
            ApiError::BadRequest(reason) => {
                tracing::debug!("Rejected request body: {}", reason);
                BadRequestTemplate { messages: vec![] }.render()
            }
        };

        match page {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {:?}", e);
                (status, self.to_string()).into_response()
            }
        }
    }
}

/// Result type alias for web handlers
pub type ApiResult<T> = Result<T, ApiError>;
