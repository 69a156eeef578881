//! Transport contract between the reconciler and the Content Management API.

use async_trait::async_trait;
use contentful_core::ContentfulError;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Versioned media type the Content Management API expects.
pub const CMA_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Media type for JSON Patch bodies.
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

pub const VERSION_HEADER: &str = "X-Contentful-Version";
pub const ORGANIZATION_HEADER: &str = "X-Contentful-Organization";
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";
pub const SOURCE_ENVIRONMENT_HEADER: &str = "X-Contentful-Source-Environment";
pub const MARKETPLACE_HEADER: &str = "X-Contentful-Marketplace";

/// One request against the API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub version: Option<u64>,
    pub body: Option<Value>,
    pub headers: Vec<(&'static str, String)>,
    pub content_type: &'static str,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            version: None,
            body: None,
            headers: Vec::new(),
            content_type: CMA_CONTENT_TYPE,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets the optimistic concurrency token.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }

    /// Only reads are replayed after a timeout; a timed out write may have
    /// reached the server.
    pub fn is_idempotent(&self) -> bool {
        self.method == Method::GET
    }

    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Status code and decoded body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Error message reported by the API, or the raw body.
    pub fn error_message(&self) -> String {
        if let Some(message) = self.body.get("message").and_then(Value::as_str) {
            let details = self
                .body
                .pointer("/details/errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(|e| {
                            e.get("details")
                                .or_else(|| e.get("name"))
                                .and_then(Value::as_str)
                        })
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default();
            if details.is_empty() {
                return message.to_string();
            }
            return format!("{message} ({details})");
        }
        match &self.body {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Issues authenticated requests. Implementations surface every HTTP status
/// as a response; only network failures become errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ContentfulError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_version_and_headers() {
        let req = ApiRequest::put("/spaces/s/environments/e/entries/x")
            .with_version(3)
            .with_header(CONTENT_TYPE_HEADER, "blog")
            .with_body(json!({"fields": {}}));
        assert_eq!(req.version, Some(3));
        assert_eq!(req.headers, vec![(CONTENT_TYPE_HEADER, "blog".to_string())]);
        assert_eq!(req.content_type, CMA_CONTENT_TYPE);
        assert_eq!(req.describe(), "PUT /spaces/s/environments/e/entries/x");
        assert!(!req.is_idempotent());
        assert!(ApiRequest::get("/x").is_idempotent());
    }

    #[test]
    fn error_message_prefers_api_message() {
        let resp = ApiResponse::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "sys": {"type": "Error", "id": "ValidationFailed"},
                "message": "Validation error",
                "details": {"errors": [{"name": "size", "details": "Size must be at most 5"}]}
            }),
        );
        assert_eq!(resp.error_message(), "Validation error (Size must be at most 5)");

        let resp = ApiResponse::new(StatusCode::BAD_GATEWAY, json!("upstream down"));
        assert_eq!(resp.error_message(), "upstream down");
    }

    #[test]
    fn status_predicates() {
        assert!(ApiResponse::new(StatusCode::CONFLICT, Value::Null).is_conflict());
        assert!(ApiResponse::new(StatusCode::NOT_FOUND, Value::Null).is_not_found());
    }
}
