#![allow(unused_crate_dependencies, clippy::panic)]

mod request;

use std::sync::OnceLock;

use graphql_http::{GraphqlHttp, Options, OptionsSource, Schema};
use graphql_mocks::MockSchema;
use tokio::runtime::Runtime;

pub use request::{TestRequest, TestResponse};

pub const ENDPOINT: &str = "/graphql";

#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::filter::EnvFilter::builder()
        .parse(std::env::var("RUST_LOG").unwrap_or("graphql_http=debug".to_string()))
        .unwrap();
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .without_time()
        .init();
}

pub fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    })
}

/// A GraphQL endpoint mounted on [`ENDPOINT`], called without any network.
#[derive(Clone)]
pub struct TestServer {
    router: axum::Router,
}

impl TestServer {
    pub fn new<S: Schema>(service: GraphqlHttp<S>) -> Self {
        TestServer {
            router: service.router(ENDPOINT),
        }
    }

    pub fn with_options<S: Schema>(options: impl Into<OptionsSource<S>>) -> Self {
        Self::new(GraphqlHttp::new(options))
    }

    /// The tea shop schema with default options.
    pub fn tea_shop() -> Self {
        Self::with_options(tea_shop_options())
    }

    pub fn get(&self, params: &[(&str, &str)]) -> TestRequest {
        self.execute(http::Method::GET, params)
    }

    pub fn post(&self, params: &[(&str, &str)]) -> TestRequest {
        self.execute(http::Method::POST, params)
    }

    /// A request to the endpoint with `params` in its query string.
    pub fn execute(&self, method: http::Method, params: &[(&str, &str)]) -> TestRequest {
        let query = serde_urlencoded::to_string(params).unwrap();
        let uri = if query.is_empty() {
            format!("http://127.0.0.1{ENDPOINT}")
        } else {
            format!("http://127.0.0.1{ENDPOINT}?{query}")
        };

        let (mut parts, _) = http::Request::new(()).into_parts();
        parts.method = method;
        parts.uri = uri.parse().unwrap();

        TestRequest::new(self.router.clone(), parts)
    }
}

pub fn tea_shop_options() -> Options<MockSchema> {
    Options::new(graphql_mocks::tea_shop::schema())
}
