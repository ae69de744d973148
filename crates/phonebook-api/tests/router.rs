//! HTTP surface over the in-memory store with real JWT validation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use phonebook_api::{build_router, AppState};
use phonebook_core::services::{
    CredentialResolver, DepartmentService, EmergencyListing, IdentityError, IdentityProvider,
    WorkerService,
};
use phonebook_core::{EmergencyService, SubjectId, TenantRouter};
use phonebook_infrastructure::MemoryDirectory;
use phonebook_security::JwtService;
use phonebook_shared::config::default_tenants;

const SECRET: &str = "router-test-secret";
const ADMIN: i64 = 1;
const USER: i64 = 2;
const UNREACHABLE: i64 = 3;

/// Admin lookups answered from a fixed table; unknown subjects error.
struct StaticIdentity(HashMap<i64, bool>);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn is_admin(&self, subject: SubjectId) -> Result<bool, IdentityError> {
        self.0
            .get(&subject.0)
            .copied()
            .ok_or_else(|| IdentityError::Unavailable("identity service down".into()))
    }
}

fn app() -> Router {
    let router = Arc::new(TenantRouter::new(&default_tenants()).unwrap());
    let store = Arc::new(MemoryDirectory::new().with_services(vec![
        EmergencyService { id: 2, name: "Police".into(), phone_number: "02".into(), email: None },
        EmergencyService { id: 1, name: "Fire".into(), phone_number: "01".into(), email: None },
    ]));
    let identity = StaticIdentity(HashMap::from([(ADMIN, true), (USER, false)]));

    build_router(AppState {
        workers: Arc::new(WorkerService::new(router.clone(), store.clone(), store.clone())),
        departments: Arc::new(DepartmentService::new(router, store.clone(), store.clone())),
        emergency: Arc::new(EmergencyListing::new(store)),
        resolver: Arc::new(CredentialResolver::new(
            Arc::new(JwtService::new(SECRET)),
            Arc::new(identity),
        )),
        deadline: None,
        shutdown: CancellationToken::new(),
    })
}

fn bearer(uid: i64) -> String {
    let token = JwtService::new(SECRET).generate_token(uid, None, 600).unwrap();
    format!("Bearer {}", token)
}

fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn role_for(app: &Router, auth: Option<&str>) -> String {
    let (status, body) = send(app, request("GET", "/api/v1/auth/role", auth, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["role"].as_str().unwrap_or_default().to_string()
}

fn ana() -> Value {
    json!({
        "surname": "Smith",
        "name": "Ana",
        "email": "ana@grafit.ru",
        "phone_number": "100"
    })
}

#[tokio::test]
async fn role_resolution_paths() {
    let app = app();
    assert_eq!(role_for(&app, None).await, "guest");
    assert_eq!(role_for(&app, Some("Basic dXNlcjpwYXNz")).await, "guest");
    assert_eq!(role_for(&app, Some("Bearer not-a-jwt")).await, "guest");

    let forged = JwtService::new("other-secret").generate_token(ADMIN, None, 600).unwrap();
    assert_eq!(role_for(&app, Some(&format!("Bearer {}", forged))).await, "guest");

    assert_eq!(role_for(&app, Some(&bearer(ADMIN))).await, "admin");
    assert_eq!(role_for(&app, Some(&bearer(USER))).await, "user");
    // identity lookup fails: degrade to user, never admin or guest
    assert_eq!(role_for(&app, Some(&bearer(UNREACHABLE))).await, "user");
}

#[tokio::test]
async fn guest_reads_but_cannot_write() {
    let app = app();
    let (status, body) = send(&app, request("POST", "/api/v1/grafit/workers", None, Some(ana()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, request("GET", "/api/v1/grafit/workers", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn worker_lifecycle_over_http() {
    let app = app();
    let user = bearer(USER);
    let admin = bearer(ADMIN);

    let (status, body) = send(&app, request("POST", "/api/v1/%D0%93%D1%80%D0%B0%D1%84%D0%B8%D1%82/workers", Some(&user), Some(ana()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "ana@grafit.ru");

    let (status, _) = send(&app, request("POST", "/api/v1/grafit/workers", Some(&user), Some(ana()))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, request("GET", "/api/v1/grafit/workers/search?q=ana%20sm", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, request("DELETE", "/api/v1/grafit/workers/ana@grafit.ru", Some(&user), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, request("DELETE", "/api/v1/grafit/workers/ana@grafit.ru", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request("GET", "/api/v1/grafit/workers/ana@grafit.ru", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_tenant_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/api/v1/atlantis/workers", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNKNOWN_TENANT");
}

#[tokio::test]
async fn import_abort_reports_position() {
    let app = app();
    let user = bearer(USER);
    let batch = json!([
        { "surname": "A", "name": "A", "email": "a@grafit.ru", "phone_number": "1" },
        { "surname": "B", "name": "B", "email": "a@grafit.ru", "phone_number": "2" }
    ]);

    let (status, body) = send(&app, request("POST", "/api/v1/grafit/workers/import", Some(&user), Some(batch))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "IMPORT_ABORTED");
    assert_eq!(body["error"]["details"]["position"], 2);
    assert_eq!(body["error"]["details"]["email"], "a@grafit.ru");

    let (_, body) = send(&app, request("GET", "/api/v1/grafit/workers", None, None)).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn departments_over_http() {
    let app = app();
    let admin = bearer(ADMIN);
    let draft = json!({ "name": "Laboratory", "sections": ["Analytics", "Metrology"] });

    let (status, _) = send(&app, request("POST", "/api/v1/giredmet/departments", Some(&bearer(USER)), Some(draft.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, request("POST", "/api/v1/giredmet/departments", Some(&admin), Some(draft))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request("GET", "/api/v1/giredmet/departments/Laboratory/sections", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][1]["name"], "Metrology");
}

#[tokio::test]
async fn services_are_global_and_sorted() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/api/v1/services", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Fire");
    assert_eq!(body["data"][1]["name"], "Police");
}

#[tokio::test]
async fn photo_upload_and_fetch() {
    let app = app();
    let user = bearer(USER);
    send(&app, request("POST", "/api/v1/grafit/workers", Some(&user), Some(ana()))).await;

    let upload = Request::builder()
        .method("POST")
        .uri("/api/v1/grafit/workers/ana@grafit.ru/photo")
        .header(header::AUTHORIZATION, &user)
        .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
        .unwrap();
    let response = app.clone().oneshot(upload).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/grafit/workers/ana@grafit.ru/photo", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
}
