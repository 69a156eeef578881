//! Shared fixtures for the wiremock-backed reconciler tests.
#![allow(dead_code)]

use contentful_config::ProviderConfig;
use contentful_provider::ProviderContext;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const SPACE: &str = "sp1";
pub const ENV: &str = "master";
pub const PUBLISHED_AT: &str = "2024-05-01T10:00:00Z";
pub const ARCHIVED_AT: &str = "2024-05-02T10:00:00Z";

/// Context pointed at `server` with millisecond polling intervals.
pub fn context(server: &MockServer) -> ProviderContext {
    let mut config = ProviderConfig::new("CFPAT-test")
        .with_base_url(server.uri())
        .with_organization_id("org1");
    config.http.retry_base_ms = 1;
    for polling in [&mut config.asset_processing, &mut config.environment_ready] {
        polling.initial_interval_ms = 1;
        polling.max_interval_ms = 2;
        polling.max_attempts = 5;
    }
    ProviderContext::from_config(config).expect("context")
}

pub fn env_path(rest: &str) -> String {
    format!("/spaces/{SPACE}/environments/{ENV}/{rest}")
}

/// A `sys` block with the lifecycle timestamps set as requested.
pub fn sys(id: &str, kind: &str, version: u64, published: bool, archived: bool) -> Value {
    let mut sys = json!({"id": id, "type": kind, "version": version});
    if published {
        sys["publishedAt"] = json!(PUBLISHED_AT);
        sys["publishedVersion"] = json!(version - 1);
    }
    if archived {
        sys["archivedAt"] = json!(ARCHIVED_AT);
        sys["archivedVersion"] = json!(version - 1);
    }
    sys
}

pub fn entry_body(version: u64, published: bool, archived: bool) -> Value {
    let mut sys = sys("e1", "Entry", version, published, archived);
    sys["contentType"] = json!({"sys": {"type": "Link", "linkType": "ContentType", "id": "post"}});
    json!({
        "fields": {"title": {"en-US": "Hello"}},
        "sys": sys
    })
}
