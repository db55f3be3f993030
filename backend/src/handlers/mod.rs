//! HTTP handlers for the harvest estimation API

mod harvest;
mod health;

pub use harvest::*;
pub use health::*;

use serde::Serialize;

/// Success envelope shared by every API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
