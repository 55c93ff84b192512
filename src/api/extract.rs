//! Request extractors whose rejections render as `AppError`.
//!
//! Malformed bodies and query strings answer with a 400 `{"error": ...}`
//! instead of axum's plain-text rejections.

use crate::types::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Deserialized query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
