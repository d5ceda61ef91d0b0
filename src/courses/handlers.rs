use axum::{
    body::Bytes,
    extract::{Json, State},
};
use serde::Serialize;

use super::extract::CourseIdParam;
use crate::app::AppState;
use crate::config::NotFoundPolicy;
use crate::db_mongo::models::{Course, CourseId, CoursePatch, UpdateSummary};
use crate::db_mongo::queries::CourseStore;
use crate::error::{ApiError, CourseOperation};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn get_course(
    State(state): State<AppState>,
    CourseIdParam(id): CourseIdParam,
) -> Result<Json<Option<Course>>, ApiError> {
    let course = state
        .store
        .find_by_id(id)
        .await
        .map_err(ApiError::operation(CourseOperation::Retrieve, id))?;

    if course.is_none() && state.not_found == NotFoundPolicy::Strict {
        return Err(ApiError::NotFound);
    }

    Ok(Json(course))
}

pub async fn update_course(
    State(state): State<AppState>,
    CourseIdParam(id): CourseIdParam,
    body: Bytes,
) -> Result<Json<UpdateSummary>, ApiError> {
    let summary = apply_patch(state.store.as_ref(), id, &body)
        .await
        .map_err(ApiError::operation(CourseOperation::Update, id))?;

    if summary.matched_count == 0 && state.not_found == NotFoundPolicy::Strict {
        return Err(ApiError::NotFound);
    }

    Ok(Json(summary))
}

/// Merge the request body over the stored course and write the result back.
async fn apply_patch(
    store: &dyn CourseStore,
    id: CourseId,
    body: &[u8],
) -> anyhow::Result<UpdateSummary> {
    let patch = CoursePatch::from_json_slice(body)?;
    let existing = store.find_by_id(id).await?;
    let merged = patch.merge_over(existing);

    tracing::debug!(course_id = id.0, fields = merged.len(), "Updating course");
    store.set_fields(id, merged).await
}

pub async fn delete_course(
    State(state): State<AppState>,
    CourseIdParam(id): CourseIdParam,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state
        .store
        .delete_by_id(id)
        .await
        .map_err(ApiError::operation(CourseOperation::Delete, id))?;

    if outcome.deleted_count == 0 {
        tracing::debug!(course_id = id.0, "Delete matched no course");
        if state.not_found == NotFoundPolicy::Strict {
            return Err(ApiError::NotFound);
        }
    }

    Ok(Json(DeleteResponse {
        message: format!("Course with ID {} deleted.", id),
    }))
}
