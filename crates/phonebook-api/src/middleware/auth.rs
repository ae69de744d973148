//! Role resolution: every request leaves here with a `RequestContext`
//! extension, whatever its credential looked like.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use phonebook_core::RequestContext;
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;

pub async fn resolve_role(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let resolution = state.resolver.resolve(authorization.as_deref()).await;

    let mut ctx = RequestContext::new(resolution.role, resolution.subject)
        .with_cancellation(state.shutdown.child_token())
        .with_deadline(state.deadline);
    if let Some(id) = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
    {
        ctx.request_id = id;
    }

    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id,
        role = ctx.role.as_str(),
    );
    request.extensions_mut().insert(ctx);
    next.run(request).instrument(span).await
}
