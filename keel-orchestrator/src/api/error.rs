//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::{application_service, job_service, project_service};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    DatabaseError(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<project_service::ProjectError> for ApiError {
    fn from(err: project_service::ProjectError) -> Self {
        match err {
            project_service::ProjectError::NotFound(name) => {
                ApiError::NotFound(format!("Project {} not found", name))
            }
            project_service::ProjectError::ValidationError(msg) => ApiError::BadRequest(msg),
            project_service::ProjectError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<application_service::ApplicationError> for ApiError {
    fn from(err: application_service::ApplicationError) -> Self {
        match err {
            application_service::ApplicationError::NotFound(name) => {
                ApiError::NotFound(format!("Application {} not found", name))
            }
            application_service::ApplicationError::ProjectNotFound(name) => {
                ApiError::NotFound(format!("Project {} not found", name))
            }
            application_service::ApplicationError::ValidationError(msg) => {
                ApiError::BadRequest(msg)
            }
            application_service::ApplicationError::DatabaseError(err) => {
                ApiError::DatabaseError(err)
            }
        }
    }
}

impl From<job_service::JobError> for ApiError {
    fn from(err: job_service::JobError) -> Self {
        match err {
            job_service::JobError::NotFound(id) => ApiError::NotFound(format!("Job {} not found", id)),
            job_service::JobError::InvalidState(msg) => ApiError::Conflict(msg),
            job_service::JobError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
