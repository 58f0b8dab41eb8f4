//! Body and path extractors whose rejections go through [`AppError`].

use axum::extract::{FromRequest, FromRequestParts, Json, Path};

use crate::error::AppError;

/// `Json<T>` that rejects malformed or mistyped bodies with `InvalidInput`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path<T>` that rejects unparsable segments with `InvalidInput`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
