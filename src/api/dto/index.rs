//! DTO for the service banner.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
}
