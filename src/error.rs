use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db_mongo::models::CourseId;

/// Which course endpoint an operational failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseOperation {
    Retrieve,
    Update,
    Delete,
}

impl CourseOperation {
    pub fn failure_message(self) -> &'static str {
        match self {
            CourseOperation::Retrieve => "Failed to retrieve course.",
            CourseOperation::Update => "Failed to update course.",
            CourseOperation::Delete => "Failed to delete course.",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            CourseOperation::Retrieve => "retrieving",
            CourseOperation::Update => "updating",
            CourseOperation::Delete => "deleting",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid course ID.")]
    InvalidCourseId,

    #[error("Course not found.")]
    NotFound,

    #[error("{}", .op.failure_message())]
    Operation {
        op: CourseOperation,
        id: CourseId,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn operation(op: CourseOperation, id: CourseId) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| ApiError::Operation { op, id, cause }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidCourseId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Operation { op, id, cause } => {
                // The cause stays in the logs; callers only get the generic message.
                tracing::error!(course_id = id.0, "Error {} course: {:#}", op.verb(), cause);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
