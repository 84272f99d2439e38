// src/server/handler.rs
use crate::health::{HealthRegistry, HealthStatus};
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::{debug, error};

/// Serves `GET {path}` (all indicators) and `GET {path}/{name}` (one indicator).
#[derive(Clone)]
pub struct HealthHandler {
    registry: HealthRegistry,
    path: Arc<str>,
}

impl HealthHandler {
    pub fn new(registry: HealthRegistry, path: impl Into<String>) -> Self {
        let path: String = path.into();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Self {
            registry,
            path: Arc::from(path),
        }
    }

    pub async fn respond(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("{} {}", method, path);

        let Some(component) = self.match_path(&path) else {
            return plain(StatusCode::NOT_FOUND, "Not Found");
        };

        if method != Method::GET {
            let mut resp = plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            resp.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
            return resp;
        }

        match component {
            None => {
                let composite = self.registry.aggregate().await;
                json(status_code(composite.status), &composite)
            }
            Some(name) => match self.registry.health_of(name).await {
                Some(health) => json(status_code(health.status()), &health),
                None => plain(StatusCode::NOT_FOUND, "Unknown health component"),
            },
        }
    }

    /// `Some(None)` for the base path, `Some(Some(name))` for a component.
    fn match_path<'a>(&self, path: &'a str) -> Option<Option<&'a str>> {
        let path = path.trim_end_matches('/');
        let base = self.path.trim_end_matches('/');
        if path == base {
            return Some(None);
        }

        let name = path.strip_prefix(base)?.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Some(name))
    }
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.respond(req).await) })
    }
}

pub fn status_code(status: HealthStatus) -> StatusCode {
    if status.is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut resp = Response::new(Body::from(bytes));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }
        Err(e) => {
            error!(%e, "failed to serialize health response");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut resp = Response::new(Body::from(message));
    *resp.status_mut() = status;
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Health, HealthError, HealthIndicator};
    use async_trait::async_trait;
    use tower::ServiceExt;

    struct Fixed(HealthStatus);

    #[async_trait]
    impl HealthIndicator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn check(&self) -> Result<Health, HealthError> {
            Ok(Health::builder().status(self.0).build())
        }
    }

    fn handler(statuses: &[(&str, HealthStatus)]) -> HealthHandler {
        let registry = HealthRegistry::new();
        for (name, status) in statuses {
            registry.register(*name, Arc::new(Fixed(*status))).unwrap();
        }
        HealthHandler::new(registry, "/health")
    }

    async fn get(handler: HealthHandler, uri: &str) -> (StatusCode, String) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let resp = handler.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_aggregate_up_is_ok() {
        let (status, body) = get(handler(&[("couchbase", HealthStatus::Up)]), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "UP");
        assert_eq!(value["components"]["couchbase"]["status"], "UP");
    }

    #[tokio::test]
    async fn test_down_component_is_unavailable() {
        let h = handler(&[("couchbase", HealthStatus::Down), ("disk", HealthStatus::Up)]);

        let (status, _) = get(h.clone(), "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = get(h.clone(), "/health/couchbase").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"status":"DOWN"}"#);

        let (status, _) = get(h, "/health/disk/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_paths_are_not_found() {
        let h = handler(&[("couchbase", HealthStatus::Up)]);
        assert_eq!(get(h.clone(), "/health/redis").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(h.clone(), "/healthz").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(h, "/health/a/b").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let req = Request::post("/health").body(Body::empty()).unwrap();
        let resp = handler(&[]).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(status_code(HealthStatus::Up), StatusCode::OK);
        assert_eq!(status_code(HealthStatus::Unknown), StatusCode::OK);
        assert_eq!(status_code(HealthStatus::Down), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_code(HealthStatus::OutOfService), StatusCode::SERVICE_UNAVAILABLE);
    }
}
