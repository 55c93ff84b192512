use crate::types::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "User-Id";

/// The authenticated caller, taken from the `User-Id` header.
///
/// A missing, non-UTF-8 or blank header is rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| AuthUser(id.to_string()))
            .ok_or_else(|| AppError::Auth(format!("Missing or empty {} header", USER_ID_HEADER)))
    }
}
