//! HTTP transport for the Contentful Content Management API.
//!
//! [`Transport`] is the seam the reconciler talks to; [`CmaClient`] is the
//! reqwest implementation with bearer authentication, the versioned media
//! type and bounded retries for transient failures.

mod client;
pub mod transport;

pub use client::CmaClient;
pub use transport::{
    ApiRequest, ApiResponse, CMA_CONTENT_TYPE, CONTENT_TYPE_HEADER, JSON_PATCH_CONTENT_TYPE,
    MARKETPLACE_HEADER, ORGANIZATION_HEADER, SOURCE_ENVIRONMENT_HEADER, Transport, VERSION_HEADER,
};

/// Re-exported so callers can build requests without depending on reqwest.
pub use reqwest::{Method, StatusCode};
