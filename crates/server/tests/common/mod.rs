//! Common test utilities for E2E testing with mocks.
//!
//! Builds an in-process server over a temp-file SQLite store and a scripted
//! `MockEngine`, so full request → crawl → store → response flows run
//! without a network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bookmirror_core::{
    testing::MockEngine, BestsellerScraper, BrowserEngine, CatalogStore, CategoryCrawler, Config,
    NavigationSync, ProductEnricher, SqliteStore,
};
use bookmirror_server::api::create_router;
use bookmirror_server::state::AppState;

/// Base URL every fixture page is scripted under.
pub const BASE: &str = "https://shop.test";

/// Re-export fixtures for test convenience
pub use bookmirror_core::testing::fixtures;

/// Test fixture for E2E testing with a scripted engine.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().await;
/// fixture.engine.add_page(format!("{BASE}/"), fixtures::nav_page(&[...])).await;
///
/// let response = fixture.get("/api/v1/navigation").await;
/// assert_eq!(response.status, StatusCode::OK);
/// ```
pub struct TestFixture {
    /// The Axum router for in-process requests.
    pub router: Router,
    /// Scripted browser engine.
    pub engine: Arc<MockEngine>,
    /// The real SQLite store behind the server.
    pub store: Arc<SqliteStore>,
    /// Holds the temp database file alive.
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with an empty store and no scripted pages.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let engine = Arc::new(MockEngine::new());
        let store = Arc::new(SqliteStore::new(&db_path).expect("Failed to create store"));

        let mut config = Config::default();
        config.site.base_url = BASE.to_string();
        config.database.path = db_path;

        let store_dyn: Arc<dyn CatalogStore> = Arc::clone(&store) as Arc<dyn CatalogStore>;
        let engine_dyn: Arc<dyn BrowserEngine> = Arc::clone(&engine) as Arc<dyn BrowserEngine>;

        let navigation = Arc::new(NavigationSync::new(
            Arc::clone(&store_dyn),
            Arc::clone(&engine_dyn),
            config.site.clone(),
            config.crawler.clone(),
        ));
        let crawler = Arc::new(CategoryCrawler::new(
            Arc::clone(&store_dyn),
            Arc::clone(&engine_dyn),
            Arc::clone(&navigation),
            config.crawler.clone(),
        ));
        let bestsellers = Arc::new(BestsellerScraper::new(
            Arc::clone(&store_dyn),
            Arc::clone(&engine_dyn),
            config.site.clone(),
            config.crawler.clone(),
        ));
        let enricher = Arc::new(ProductEnricher::new(
            Arc::clone(&store_dyn),
            Arc::clone(&engine_dyn),
            config.site.clone(),
            config.crawler.clone(),
        ));

        let state = Arc::new(AppState::new(
            config, store_dyn, navigation, crawler, bestsellers, enricher,
        ));
        let router = create_router(state);

        Self {
            router,
            engine,
            store,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
