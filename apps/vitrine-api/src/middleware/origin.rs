//! Origin allow-list middleware.
//!
//! A request whose `Origin` header is not in the list is answered with 403
//! before it reaches routing. Requests without an `Origin` header pass, and
//! an empty list lets everything through.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

/// Body of the 403 returned for a blocked origin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForbiddenOrigin {
    pub error: &'static str,
    pub message: &'static str,
    pub status_code: u16,
    pub timestamp: String,
}

impl ForbiddenOrigin {
    fn now() -> Self {
        Self {
            error: "Forbidden",
            message: "Not allowed",
            status_code: StatusCode::FORBIDDEN.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl IntoResponse for ForbiddenOrigin {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, Json(self)).into_response()
    }
}

/// Case-insensitive set of allowed origins.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Arc<[String]>,
}

impl OriginAllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|o| o.as_ref().trim().to_ascii_lowercase())
            .filter(|o| !o.is_empty())
            .collect();
        Self {
            origins: origins.into(),
        }
    }

    /// An empty list allows every origin.
    pub fn allows_all(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allows_all() || self.origins.iter().any(|o| o.eq_ignore_ascii_case(origin))
    }
}

/// Layer enforcing the origin allow-list.
#[derive(Debug, Clone)]
pub struct OriginLayer {
    allow_list: OriginAllowList,
}

impl OriginLayer {
    pub fn new(allow_list: OriginAllowList) -> Self {
        Self { allow_list }
    }
}

impl<S> Layer<S> for OriginLayer {
    type Service = OriginService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OriginService {
            inner,
            allow_list: self.allow_list.clone(),
        }
    }
}

/// Origin allow-list service wrapper.
#[derive(Debug, Clone)]
pub struct OriginService<S> {
    inner: S,
    allow_list: OriginAllowList,
}

impl<S> Service<Request<Body>> for OriginService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        if let Some(origin) = request.headers().get(header::ORIGIN) {
            let origin = origin.to_str().unwrap_or("<non-utf8>");
            if !self.allow_list.is_allowed(origin) {
                tracing::warn!(
                    target: "security",
                    event_type = "origin_rejected",
                    origin = %origin,
                    path = %request.uri().path(),
                    "Request blocked by origin allow-list"
                );
                return Box::pin(async { Ok(ForbiddenOrigin::now().into_response()) });
            }
        }

        // Use the instance that was polled ready, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(request).await })
    }
}
