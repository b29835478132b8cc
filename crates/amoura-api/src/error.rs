//! API error type and [`axum::response::IntoResponse`] implementation.

use amoura_core::{service::SwipeError, swipe::Swipe};
use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The request outran the server's timeout. A swipe may have been saved.
  #[error("request timed out")]
  Timeout,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The swipe was saved; whether it matched is unknown.
  #[error("swipe recorded but match status is unknown: {source}")]
  MatchIndeterminate {
    swipe:  Box<Swipe>,
    #[source]
    source: amoura_core::Error,
  },
}

impl From<amoura_core::Error> for ApiError {
  fn from(e: amoura_core::Error) -> Self {
    use amoura_core::Error as E;
    match e {
      E::InvalidArgument(m) => Self::BadRequest(m),
      E::MatchNotFound(id) => Self::NotFound(format!("match {id} not found")),
      E::MatchInactive(id) => Self::Conflict(format!("match {id} is no longer active")),
      E::EmailTaken(email) => Self::Conflict(format!("email {email} is already registered")),
      E::Storage(inner) => Self::Store(inner),
    }
  }
}

impl ApiError {
  /// Convert a backend error through the core classification.
  pub fn from_store<E: Into<amoura_core::Error>>(e: E) -> Self {
    let core: amoura_core::Error = e.into();
    Self::from(core)
  }
}

impl From<SwipeError> for ApiError {
  fn from(e: SwipeError) -> Self {
    match e {
      SwipeError::Record(inner) => inner.into(),
      SwipeError::MatchIndeterminate { swipe, source } => {
        Self::MatchIndeterminate { swipe, source }
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(m) => message(StatusCode::BAD_REQUEST, m),
      ApiError::Unauthorized => {
        let mut res = message(StatusCode::UNAUTHORIZED, "unauthorized".into());
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"amoura\""),
        );
        res
      }
      ApiError::NotFound(m) => message(StatusCode::NOT_FOUND, m),
      ApiError::Conflict(m) => message(StatusCode::CONFLICT, m),
      ApiError::Timeout => message(
        StatusCode::REQUEST_TIMEOUT,
        "request timed out; a swipe may have been saved, retry it".into(),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        message(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::MatchIndeterminate { swipe, source } => {
        tracing::error!(
          actor = %swipe.actor,
          target = %swipe.target,
          error = %source,
          "swipe recorded but match detection failed",
        );
        let body = json!({
          "message": "swipe recorded but match status is unknown; retry the swipe",
          "swipe": swipe,
          "matched": null,
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
      }
    }
  }
}

fn message(status: StatusCode, message: String) -> Response {
  (status, Json(json!({ "message": message }))).into_response()
}
