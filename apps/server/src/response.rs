//! Response envelope.
//!
//! Every endpoint answers with the same JSON shape:
//!
//! ```json
//! { "success": true, "data": ..., "count": 3 }
//! { "success": false, "error": "Serial number 'SN-1' already exists" }
//! ```
//!
//! `count` is only present on list responses, `message` only on mutations
//! that want to say something beyond the payload.

use serde::Serialize;

/// Uniform response envelope for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful single-payload response.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            count: None,
        }
    }

    /// A successful response with a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
            count: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A successful list response; `count` mirrors the list length.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        ApiResponse {
            success: true,
            data: Some(items),
            error: None,
            message: None,
            count: Some(count),
        }
    }
}

impl ApiResponse<()> {
    /// A failure envelope. Status code is chosen by the error type.
    pub fn failure(error: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            count: None,
        }
    }

    /// A successful data-less response (deletes).
    pub fn message_only(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
            count: None,
        }
    }
}
