use std::{future::IntoFuture, pin::Pin};

use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

#[must_use]
pub struct TestRequest {
    router: axum::Router,
    parts: http::request::Parts,
    body: Bytes,
}

impl TestRequest {
    pub(crate) fn new(router: axum::Router, parts: http::request::Parts) -> Self {
        TestRequest {
            router,
            parts,
            body: Bytes::new(),
        }
    }

    pub fn header<Name, Value>(mut self, name: Name, value: Value) -> Self
    where
        Name: TryInto<http::HeaderName, Error: std::fmt::Debug>,
        Value: TryInto<http::HeaderValue, Error: std::fmt::Debug>,
    {
        self.parts
            .headers
            .append(name.try_into().unwrap(), value.try_into().unwrap());
        self
    }

    /// Asks for HTML the way browsers do.
    pub fn from_browser(self) -> Self {
        self.header(
            http::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
    }

    pub fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.header(http::header::CONTENT_TYPE, content_type)
    }

    pub fn json(self, body: serde_json::Value) -> Self {
        self.body("application/json", serde_json::to_vec(&body).unwrap())
    }
}

impl IntoFuture for TestRequest {
    type Output = TestResponse;
    type IntoFuture = Pin<Box<dyn std::future::Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let request = http::Request::from_parts(self.parts, axum::body::Body::from(self.body));
            let response = self.router.oneshot(request).await.unwrap();

            let (parts, body) = response.into_parts();
            TestResponse {
                status: parts.status,
                headers: parts.headers,
                body: body.collect().await.unwrap().to_bytes(),
            }
        })
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: http::StatusCode,
    pub headers: http::HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
