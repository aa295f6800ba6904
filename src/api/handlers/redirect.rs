//! Handler for short link redirects.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Responses
///
/// - **302 Found** with `Location` set to the stored URL
/// - **404 Not Found** for unknown codes, malformed codes, and stored URLs
///   that fail the safety re-check; the body never says which
///
/// Click counting happens in the background and never delays the response.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let destination = state.resolver.resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, destination)]))
}
