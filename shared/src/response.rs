//! API response types
//!
//! Standardized response envelope for the entire backend

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// All endpoints return this format:
/// ```json
/// {
///     "success": true,
///     "message": "...",
///     "data": { ... },
///     "pagination": { "page": 1, "page_size": 20, "total": 42 }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable message (always present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Pagination metadata for list endpoints (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    /// Create a successful response with a message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }

    /// Create a successful response carrying no data
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }

    /// Create a successful paginated response
    pub fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }
    }

    /// Create an error response
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Total number of items
    pub total: u64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"id": "user:abc"}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("message").is_none());
        assert!(value.get("pagination").is_none());

        let resp = ApiResponse::<()>::failure("Invalid credentials");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Invalid credentials");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_paginated_envelope() {
        let resp = ApiResponse::page(vec![1, 2, 3], Pagination::new(2, 3, 10));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["pagination"]["page"], 2);
        assert_eq!(value["pagination"]["page_size"], 3);
        assert_eq!(value["pagination"]["total"], 10);
    }
}
