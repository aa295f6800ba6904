//! Service banner at `/`.

use axum::Json;

use crate::api::dto::index::IndexResponse;

pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
