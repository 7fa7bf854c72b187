//! Site API integration tests
//!
//! Serves the full router (middleware included) on an ephemeral port, backed
//! by an in-process fake CMS, and drives it over HTTP with reqwest.
//!
//! ## Test Scenario
//!
//! 1. Listings come back normalized and the first page is cached
//! 2. An unreachable or failing CMS yields an empty 200 listing that is not cached
//! 3. Stale listings are served and refetched in the background
//! 4. Details, view counts and form submissions map CMS outcomes to statuses
//!
//! ## Running
//!
//! ```bash
//! cargo test -p campus-server --test site_api
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use campus_client::ClientConfig;
use campus_client::CmsClient;
use campus_client::ExecutionContext;
use campus_core::query::decode;
use campus_server::{AppState, ServerConfig, build_app};

// ============================================================================
// Fake CMS
// ============================================================================

const TOTAL_BLOGS: u64 = 27;

#[derive(Clone, Default)]
struct FakeCms {
    down: Arc<AtomicBool>,
    list_calls: Arc<AtomicUsize>,
    view_calls: Arc<AtomicUsize>,
}

impl FakeCms {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn is_down(&self) -> bool {
        self.down.load(Ordering::SeqCst)
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "data": null,
            "error": { "status": 500, "name": "InternalServerError", "message": "Internal Server Error" }
        })),
    )
        .into_response()
}

fn blog_entry(id: u64) -> Value {
    json!({
        "id": id,
        "attributes": {
            "slug": format!("post-{}", id),
            "title": format!("Post {}", id),
            "summary": "Campus news",
            "publishedAt": "2024-03-01T09:00:00.000Z",
            "views": 10
        }
    })
}

async fn blogs(State(fake): State<FakeCms>, RawQuery(query): RawQuery) -> Response {
    if fake.is_down() {
        return failure();
    }
    let pairs = decode(query.as_deref().unwrap_or_default());
    let param = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());

    if let Some(slug) = param("filters[slug][$eq]") {
        let data: Vec<Value> = (1..=TOTAL_BLOGS)
            .filter(|id| format!("post-{}", id) == slug)
            .map(blog_entry)
            .collect();
        return Json(json!({ "data": data, "meta": {} })).into_response();
    }

    fake.list_calls.fetch_add(1, Ordering::SeqCst);
    let page: u64 = param("pagination[page]").and_then(|v| v.parse().ok()).unwrap_or(1);
    let size: u64 = param("pagination[pageSize]").and_then(|v| v.parse().ok()).unwrap_or(25);
    let data: Vec<Value> = (1..=TOTAL_BLOGS)
        .skip(((page - 1) * size) as usize)
        .take(size as usize)
        .map(blog_entry)
        .collect();

    Json(json!({
        "data": data,
        "meta": { "pagination": {
            "page": page,
            "pageSize": size,
            "pageCount": TOTAL_BLOGS.div_ceil(size),
            "total": TOTAL_BLOGS
        } }
    }))
    .into_response()
}

async fn bump_views(State(fake): State<FakeCms>, Path(_id): Path<u64>) -> Response {
    if fake.is_down() {
        return failure();
    }
    fake.view_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": { "views": 11 } })).into_response()
}

async fn store_lead(State(fake): State<FakeCms>, Json(_body): Json<Value>) -> Response {
    if fake.is_down() {
        return failure();
    }
    (StatusCode::CREATED, Json(json!({ "data": { "id": 42 } }))).into_response()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Site {
    base: String,
    cms: FakeCms,
    http: Client,
    state: AppState,
}

impl Site {
    async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    async fn start_with(tune: impl FnOnce(&mut ServerConfig)) -> Self {
        let cms = FakeCms::default();
        let cms_app = Router::new()
            .route("/api/blogs", get(blogs))
            .route("/api/blogs/{id}/views", put(bump_views))
            .route("/api/leads", post(store_lead))
            .with_state(cms.clone());
        let cms_addr = serve(cms_app).await;

        let cms_url = Url::parse(&format!("http://{}", cms_addr)).unwrap();
        let mut config = ServerConfig::new(ClientConfig::new(cms_url, Some("server-secret".into())));
        tune(&mut config);

        let client = CmsClient::new(&config.cms, ExecutionContext::Server).unwrap();
        let state = AppState::with_client(client, config);
        let site_addr = serve(build_app(state.clone())).await;

        Self {
            base: format!("http://{}", site_addr),
            cms,
            http: Client::new(),
            state,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.http.get(format!("{}{}", self.base, path)).send().await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn first_page_is_served_and_cached() {
    let site = Site::start().await;

    let (status, body) = site.get("/api/content/blogs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 9);
    assert_eq!(body["pagination"]["total"], 27);
    assert_eq!(body["pagination"]["pageCount"], 3);
    assert_eq!(body["hasNextPage"], true);
    assert_eq!(body["items"][0]["slug"], "post-1");
    assert_eq!(body["items"][0]["kind"], "blog");

    let (_, again) = site.get("/api/content/blogs").await;
    assert_eq!(again, body);
    assert_eq!(site.cms.list_calls(), 1);
}

#[tokio::test]
async fn later_pages_and_searches_bypass_the_cache() {
    let site = Site::start().await;

    let (_, page3) = site.get("/api/content/blog?page=3").await;
    site.get("/api/content/blog?page=3").await;
    site.get("/api/content/blog?search=post").await;

    assert_eq!(site.cms.list_calls(), 3);
    assert_eq!(page3["items"][0]["slug"], "post-19");
    assert_eq!(page3["hasNextPage"], false);
}

#[tokio::test]
async fn failing_cms_gives_empty_listing_that_is_not_cached() {
    let site = Site::start().await;
    site.cms.set_down(true);

    let (status, body) = site.get("/api/content/blogs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["hasNextPage"], false);

    site.cms.set_down(false);
    let (_, body) = site.get("/api/content/blogs").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn stale_listing_is_served_then_revalidated() {
    let site = Site::start_with(|config| {
        config.revalidate_secs = 0;
        config.stale_grace_secs = 300;
    })
    .await;

    site.get("/api/content/blogs").await;
    assert_eq!(site.cms.list_calls(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let (status, body) = site.get("/api/content/blogs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 9);

    let mut refetched = false;
    for _ in 0..100 {
        if site.cms.list_calls() >= 2 {
            refetched = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(refetched, "stale listing was not revalidated");
}

#[tokio::test]
async fn expired_listings_are_dropped_on_refetch() {
    let site = Site::start_with(|config| {
        config.revalidate_secs = 0;
        config.stale_grace_secs = 0;
    })
    .await;

    site.get("/api/content/blogs").await;
    assert_eq!(site.state.cache().len(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let (status, body) = site.get("/api/content/blogs?pageSize=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);

    // Only the listing just fetched remains
    assert_eq!(site.state.cache().len(), 1);
}

#[tokio::test]
async fn malformed_query_is_a_json_bad_request() {
    let site = Site::start().await;

    let (status, body) = site.get("/api/content/blogs?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(site.cms.list_calls(), 0);
}

#[tokio::test]
async fn recent_leaves_out_current_item() {
    let site = Site::start().await;

    let (status, body) = site.get("/api/content/blogs/recent?exclude=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["pageSize"], 2);
}

#[tokio::test]
async fn unknown_kind_is_not_found() {
    let site = Site::start().await;

    let (status, body) = site.get("/api/content/podcasts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test]
async fn detail_by_slug() {
    let site = Site::start().await;

    let (status, body) = site.get("/api/content/blogs/post-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Post 3");
    assert_eq!(body["views"], 10);

    let (status, body) = site.get("/api/content/blogs/no-such-post").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn detail_surfaces_cms_failure() {
    let site = Site::start().await;
    site.cms.set_down(true);

    let (status, body) = site.get("/api/content/blogs/post-3").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CMS_ERROR");
    assert_eq!(body["error"]["message"], "Internal Server Error");
}

// ============================================================================
// Views and forms
// ============================================================================

#[tokio::test]
async fn view_counting_is_always_accepted() {
    let site = Site::start().await;
    let url = format!("{}/api/content/blogs/3/views", site.base);

    let response = site.http.post(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 202);
    assert_eq!(site.cms.view_calls.load(Ordering::SeqCst), 1);

    site.cms.set_down(true);
    let response = site.http.post(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 202);
}

#[tokio::test]
async fn form_submission() {
    let site = Site::start().await;
    let url = format!("{}/api/forms/enquiry", site.base);

    let invalid = json!({ "fullName": "Ada", "email": "not-an-email" });
    let response = site.http.post(&url).json(&invalid).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let incomplete = json!({ "fullName": "Ada" });
    let response = site.http.post(&url).json(&incomplete).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));

    let valid = json!({ "fullName": "Ada Lovelace", "email": "ada@example.edu", "program": "engineering" });
    let response = site.http.post(&url).json(&valid).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["form"], "enquiry");
    assert_eq!(receipt["id"], 42);

    let response = site
        .http
        .post(format!("{}/api/forms/newsletter", site.base))
        .json(&valid)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let site = Site::start().await;

    let response = site.http.get(format!("{}/health", site.base)).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let response = site
        .http
        .get(format!("{}/health", site.base))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
