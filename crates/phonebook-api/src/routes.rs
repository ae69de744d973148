//! Route table

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    middleware,
    routing::get,
    Router,
};
use phonebook_shared::constants::MAX_PHOTO_SIZE_BYTES;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handlers::{auth, departments, health, services, workers};
use crate::middleware::resolve_role;
use crate::state::AppState;

/// Leaves headroom above the photo cap so oversized photos reach the
/// service and get a descriptive 413.
const BODY_LIMIT_BYTES: usize = MAX_PHOTO_SIZE_BYTES * 2;

pub fn build_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/workers", get(workers::list_workers).post(workers::create_worker))
        .route("/workers/search", get(workers::search_workers))
        .route("/workers/import", axum::routing::post(workers::import_workers))
        .route("/workers/birthdays/{window}", get(workers::birthdays))
        .route(
            "/workers/{email}",
            get(workers::get_worker)
                .put(workers::update_worker)
                .delete(workers::delete_worker),
        )
        .route(
            "/workers/{email}/photo",
            get(workers::get_photo)
                .post(workers::upload_photo)
                .put(workers::replace_photo)
                .delete(workers::delete_photo),
        )
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/{name}",
            axum::routing::put(departments::update_department).delete(departments::delete_department),
        )
        .route("/departments/{name}/sections", get(departments::list_sections));

    let api = Router::new()
        .route("/auth/role", get(auth::check_role))
        .route("/services", get(services::list_services))
        .nest("/{institute}", tenant_routes)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_role));

    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
}
