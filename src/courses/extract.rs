use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::db_mongo::models::CourseId;
use crate::error::ApiError;

/// Parse a course id from a path segment.
///
/// Leading whitespace and a sign are allowed, then base-10 digits; anything
/// after the digits is ignored. No digits at all, or a value outside `i64`,
/// is rejected.
pub fn parse_course_id(raw: &str) -> Option<CourseId> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let value = if negative {
        format!("-{}", digits).parse::<i64>().ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(CourseId(value))
}

/// Extract and validate the `{id}` path segment.
pub struct CourseIdParam(pub CourseId);

impl<S> FromRequestParts<S> for CourseIdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InvalidCourseId)?;

        parse_course_id(&raw)
            .map(Self)
            .ok_or(ApiError::InvalidCourseId)
    }
}
