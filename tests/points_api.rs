use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use point_service::{
    app, AppError, AppState, MemoryPointStore, MemorySearchIndex, Page, PageRequest, Point, PointService, PointStore,
    Settings,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryPointStore>,
    index: Arc<MemorySearchIndex>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryPointStore::new());
    let index = Arc::new(MemorySearchIndex::new());
    let points = PointService::new(store.clone(), index.clone());
    let router = app(AppState::new(points, Settings::default()));
    TestApp { router, store, index }
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    fn header(&self, name: &str) -> &str {
        self.headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or("")
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, content_type: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, headers, body }
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some("application/json"), Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some("application/json"), Some(body)).await
    }

    async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some("application/merge-patch+json"), Some(body)).await
    }

    async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, None).await
    }

    async fn create(&self, title: &str, description: &str) -> i64 {
        let res = self
            .post("/api/points", json!({ "title": title, "description": description }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn create_assigns_fresh_id_and_location() {
    let app = test_app();
    let res = app
        .post("/api/points", json!({ "title": "Lighthouse", "description": "At the end of the pier" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["id"].as_i64().unwrap();
    assert_eq!(res.header("location"), format!("/api/points/{}", id));
    assert_eq!(res.header("x-pointsapp-alert"), "pointsApp.point.created");
    assert_eq!(res.header("x-pointsapp-params"), id.to_string());

    let second = app.create("Mill", "Old windmill").await;
    assert_ne!(id, second);
}

#[tokio::test]
async fn create_with_id_is_rejected_before_any_write() {
    let app = test_app();
    let res = app
        .post("/api/points", json!({ "id": 5, "title": "Lighthouse", "description": "pier" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idexists");
    assert_eq!(res.body["error"]["details"]["entityName"], "point");
    assert_eq!(res.header("x-pointsapp-error"), "error.idexists");
    assert_eq!(res.header("x-pointsapp-params"), "point");
    assert_eq!(app.store.writes().await, 0);
    assert_eq!(app.index.get(5).await, None);
}

#[tokio::test]
async fn create_rejects_constraint_violations() {
    let app = test_app();
    let res = app
        .post("/api/points", json!({ "title": "x".repeat(21), "description": "d" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "validation_error");

    let res = app.post("/api/points", json!({ "title": "t" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn create_with_null_or_mistyped_fields_is_validation_error() {
    let app = test_app();
    let res = app.post("/api/points", json!({ "title": null, "description": "d" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "validation_error");

    let res = app
        .post("/api/points", json!({ "id": "x", "title": "t", "description": "d" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "validation_error");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn create_with_malformed_json_is_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/points")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn create_then_get_is_field_for_field_equal() {
    let app = test_app();
    let created = app
        .post("/api/points", json!({ "title": "Bridge", "description": "Stone arch" }))
        .await;
    let id = created.body["id"].as_i64().unwrap();
    let fetched = app.get(&format!("/api/points/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
}

#[tokio::test]
async fn get_missing_is_404() {
    let app = test_app();
    let res = app.get("/api/points/424242").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_code(), "not_found");
}

#[tokio::test]
async fn update_replaces_fields_in_store_and_index() {
    let app = test_app();
    let id = app.create("Old", "old description").await;
    let res = app
        .put(
            &format!("/api/points/{}", id),
            json!({ "id": id, "title": "New", "description": "new description" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "New");
    assert_eq!(res.header("x-pointsapp-alert"), "pointsApp.point.updated");
    let indexed = app.index.get(id).await.unwrap();
    assert_eq!(indexed.title, "New");
    assert_eq!(indexed.description, "new description");
}

#[tokio::test]
async fn update_with_mismatched_id_is_idinvalid_and_leaves_point_unchanged() {
    let app = test_app();
    let id = app.create("Keep", "keep me").await;
    let res = app
        .put(
            &format!("/api/points/{}", id),
            json!({ "id": id + 1, "title": "Changed", "description": "changed" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idinvalid");
    let fetched = app.get(&format!("/api/points/{}", id)).await;
    assert_eq!(fetched.body["title"], "Keep");
    assert_eq!(fetched.body["description"], "keep me");
}

#[tokio::test]
async fn update_with_null_description_is_validation_error() {
    let app = test_app();
    let id = app.create("t", "d").await;
    let res = app
        .put(&format!("/api/points/{}", id), json!({ "id": id, "title": "t", "description": null }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "validation_error");
    assert_eq!(app.store.writes().await, 1);
}

#[tokio::test]
async fn update_without_id_is_idnull() {
    let app = test_app();
    let id = app.create("Keep", "keep me").await;
    let res = app
        .put(&format!("/api/points/{}", id), json!({ "title": "t", "description": "d" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idnull");
}

#[tokio::test]
async fn update_of_unknown_point_is_idnotfound() {
    let app = test_app();
    let res = app
        .put("/api/points/77", json!({ "id": 77, "title": "t", "description": "d" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idnotfound");
    assert_eq!(app.store.writes().await, 0);
}

#[tokio::test]
async fn patch_title_only_keeps_description() {
    let app = test_app();
    let id = app.create("Before", "unchanged description").await;
    let res = app
        .patch(&format!("/api/points/{}", id), json!({ "id": id, "title": "After" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "id": id, "title": "After", "description": "unchanged description" }));
    assert_eq!(app.index.get(id).await.unwrap().title, "After");
}

#[tokio::test]
async fn patch_description_only_keeps_title() {
    let app = test_app();
    let id = app.create("Same title", "before").await;
    let res = app
        .patch(
            &format!("/api/points/{}", id),
            json!({ "id": id, "title": null, "description": "after" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "Same title");
    assert_eq!(res.body["description"], "after");
}

#[tokio::test]
async fn patch_runs_identifier_checks() {
    let app = test_app();
    let id = app.create("t", "d").await;
    let uri = format!("/api/points/{}", id);

    let res = app.patch(&uri, json!({ "title": "x" })).await;
    assert_eq!(res.error_code(), "idnull");

    let res = app.patch(&uri, json!({ "id": id + 9, "title": "x" })).await;
    assert_eq!(res.error_code(), "idinvalid");

    let res = app.patch("/api/points/5", json!({ "id": 5, "title": "x" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idnotfound");
}

#[tokio::test]
async fn patch_checks_identifier_before_field_constraints() {
    let app = test_app();
    let id = app.create("t", "d").await;
    let uri = format!("/api/points/{}", id);

    let res = app.patch(&uri, json!({ "title": "x".repeat(25) })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "idnull");

    let res = app.patch(&uri, json!({ "id": id, "title": "x".repeat(25) })).await;
    assert_eq!(res.error_code(), "validation_error");
    assert_eq!(app.store.writes().await, 1);
}

/// Answers the existence check but has lost the row by the time it is read back.
struct VanishingStore {
    inner: MemoryPointStore,
}

#[async_trait]
impl PointStore for VanishingStore {
    async fn insert(&self, point: &Point) -> Result<Point, AppError> {
        self.inner.insert(point).await
    }

    async fn update(&self, point: &Point) -> Result<Point, AppError> {
        self.inner.update(point).await
    }

    async fn exists(&self, _id: i64) -> Result<bool, AppError> {
        Ok(true)
    }

    async fn find(&self, _id: i64) -> Result<Option<Point>, AppError> {
        Ok(None)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.inner.delete(id).await
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Point>, AppError> {
        self.inner.find_page(request).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[tokio::test]
async fn patch_of_point_gone_after_precheck_is_404() {
    let store = Arc::new(VanishingStore { inner: MemoryPointStore::new() });
    let index = Arc::new(MemorySearchIndex::new());
    let points = PointService::new(store, index.clone());
    let router = app(AppState::new(points, Settings::default()));
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/points/1500")
        .header("content-type", "application/merge-patch+json")
        .body(Body::from(json!({ "id": 1500, "title": "x" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(index.get(1500).await, None);
}

#[tokio::test]
async fn patch_requires_merge_patch_content_type() {
    let app = test_app();
    let id = app.create("t", "d").await;
    let res = app
        .send(
            Method::PATCH,
            &format!("/api/points/{}", id),
            Some("application/json"),
            Some(json!({ "id": id, "title": "x" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn delete_twice_succeeds_and_point_stays_gone() {
    let app = test_app();
    let id = app.create("Temporary", "to be removed").await;
    let uri = format!("/api/points/{}", id);

    let first = app.delete(&uri).await;
    assert_eq!(first.status, StatusCode::NO_CONTENT);
    assert_eq!(first.header("x-pointsapp-alert"), "pointsApp.point.deleted");
    let second = app.delete(&uri).await;
    assert_eq!(second.status, StatusCode::NO_CONTENT);

    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.index.get(id).await, None);
}

#[tokio::test]
async fn search_finds_created_title() {
    let app = test_app();
    let id = app.create("Observatory", "hilltop dome").await;
    app.create("Harbour", "boats").await;

    let res = app.get("/api/_search/points?query=observatory").await;
    assert_eq!(res.status, StatusCode::OK);
    let ids: Vec<i64> = res.body.as_array().unwrap().iter().filter_map(|p| p["id"].as_i64()).collect();
    assert_eq!(ids, vec![id]);
    assert_eq!(res.header("x-total-count"), "1");
    assert!(res.header("link").contains("query=observatory"));
}

#[tokio::test]
async fn search_without_query_is_rejected() {
    let app = test_app();
    let res = app.get("/api/_search/points").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_pages_with_total_and_links() {
    let app = test_app();
    for i in 0..5 {
        app.create(&format!("point {}", i), "d").await;
    }
    let res = app.get("/api/points?page=0&size=2").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 2);
    assert_eq!(res.header("x-total-count"), "5");
    let link = res.header("link");
    assert!(link.contains("</api/points?page=2&size=2>; rel=\"last\""));
    assert!(link.contains("</api/points?page=1&size=2>; rel=\"next\""));
    assert!(!link.contains("rel=\"prev\""));
}

#[tokio::test]
async fn list_honours_sort() {
    let app = test_app();
    for title in ["b", "c", "a"] {
        app.create(title, "d").await;
    }
    let res = app.get("/api/points?sort=title,desc").await;
    let titles: Vec<&str> = res.body.as_array().unwrap().iter().filter_map(|p| p["title"].as_str()).collect();
    assert_eq!(titles, vec!["c", "b", "a"]);

    let res = app.get("/api/points?sort=secret,asc").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_failure_after_store_write_is_not_rolled_back() {
    let app = test_app();
    app.index.set_unavailable(true);
    let res = app
        .post("/api/points", json!({ "title": "Orphan", "description": "store only" }))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.error_code(), "search_error");
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn readiness_reflects_collaborators() {
    let app = test_app();
    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    assert_eq!(app.get("/ready").await.status, StatusCode::OK);
    app.index.set_unavailable(true);
    assert_eq!(app.get("/ready").await.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn serves_openapi_document() {
    let app = test_app();
    let res = app.get("/v3/api-docs").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["paths"]["/api/points/{id}"].is_object());
}
