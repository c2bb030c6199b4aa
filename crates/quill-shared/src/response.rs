//! Standardized API error and acknowledgement bodies.

use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable summary, safe to show to end users.
    pub message: String,

    /// The HTTP status code.
    pub status: u16,

    /// Stable machine-readable error kind, e.g. `forbidden`.
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID for debugging purposes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            error: error.into(),
            detail: None,
            request_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn internal_error() -> Self {
        Self::new(500, "server_error", "Internal Server Error")
    }
}

/// Plain acknowledgement, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::new(404, "not_found", "Blog post not found"))
            .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "message": "Blog post not found",
                "status": 404,
                "error": "not_found",
            })
        );
    }

    #[test]
    fn request_id_is_camel_case() {
        let body = serde_json::to_value(ErrorResponse::internal_error().with_request_id("abc"))
            .unwrap();

        assert_eq!(body["requestId"], "abc");
        assert_eq!(body["status"], 500);
    }
}
