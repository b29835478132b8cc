//! The server's top-level router: the JSON API under `/api` plus tracing and
//! timeout layers.

use std::{sync::Arc, time::Duration};

use amoura_api::ApiError;
use amoura_core::store::AmouraStore;
use axum::{
  Router,
  http::StatusCode,
  middleware,
  response::{IntoResponse, Response},
  routing::get,
};
use tower_http::{
  timeout::TimeoutLayer,
  trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub fn router<S>(store: Arc<S>, request_timeout: Duration) -> Router
where
  S: AmouraStore,
{
  let routes = Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", amoura_api::api_router(store));
  with_layers(routes, request_timeout)
}

fn with_layers(routes: Router, request_timeout: Duration) -> Router {
  routes
    .layer(TimeoutLayer::new(request_timeout))
    .layer(middleware::map_response(timeout_body))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Gives the timeout layer's bare 408 the API's `{message}` body.
async fn timeout_body(res: Response) -> Response {
  if res.status() == StatusCode::REQUEST_TIMEOUT {
    ApiError::Timeout.into_response()
  } else {
    res
  }
}
