//! Shared helpers for client tests.

use cherry_core::{ApiClient, CherryClientConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::MockServer;

/// Start a mock API and a client pointed at it.
pub(crate) async fn mock_api() -> (MockServer, Arc<ApiClient>) {
    let server = MockServer::start().await;
    let config = CherryClientConfig::new("test_token")
        .unwrap()
        .with_api_url(format!("{}/v1/", server.uri()));
    let client = ApiClient::builder(config).build().unwrap();
    (server, Arc::new(client))
}

/// Load a JSON fixture from `tests/fixtures`.
pub(crate) fn fixture(name: &str) -> serde_json::Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{name}.json"));
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture at {}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("Invalid fixture {name}: {e}"))
}
