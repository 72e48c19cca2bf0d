use std::{
    convert::Infallible,
    sync::Arc,
    task::{Context, Poll},
};

use axum::body::Body;
use futures_util::{future::BoxFuture, FutureExt};
use tracing::Instrument;

use crate::{
    negotiation,
    params::{has_raw, url_fields},
    pipeline::{self, Failure},
    response::{emit, Emission},
    BodyDecoder, GraphiqlRenderer, OptionsSource, PageRenderer, RequestError, RequestParams, Schema,
    StandardBodyDecoder,
};

/// Serves GraphQL over HTTP for a single schema.
///
/// ```ignore
/// let app = GraphqlHttp::new(Options::new(schema).with_graphiql(true)).router("/graphql");
/// ```
pub struct GraphqlHttp<S: Schema> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: Schema> {
    options: OptionsSource<S>,
    body_decoder: Box<dyn BodyDecoder>,
    page_renderer: Box<dyn PageRenderer>,
}

impl<S: Schema> Clone for GraphqlHttp<S> {
    fn clone(&self) -> Self {
        GraphqlHttp {
            inner: self.inner.clone(),
        }
    }
}

pub struct GraphqlHttpBuilder<S: Schema> {
    options: OptionsSource<S>,
    body_decoder: Option<Box<dyn BodyDecoder>>,
    page_renderer: Option<Box<dyn PageRenderer>>,
}

impl<S: Schema> GraphqlHttpBuilder<S> {
    #[must_use]
    pub fn body_decoder(mut self, decoder: impl BodyDecoder + 'static) -> Self {
        self.body_decoder = Some(Box::new(decoder));
        self
    }

    #[must_use]
    pub fn page_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.page_renderer = Some(Box::new(renderer));
        self
    }

    pub fn build(self) -> GraphqlHttp<S> {
        GraphqlHttp {
            inner: Arc::new(Inner {
                options: self.options,
                body_decoder: self
                    .body_decoder
                    .unwrap_or_else(|| Box::new(StandardBodyDecoder::default())),
                page_renderer: self
                    .page_renderer
                    .unwrap_or_else(|| Box::new(GraphiqlRenderer::default())),
            }),
        }
    }
}

impl<S: Schema> GraphqlHttp<S> {
    /// Uses the standard body decoder and GraphiQL.
    pub fn new(options: impl Into<OptionsSource<S>>) -> Self {
        Self::builder(options).build()
    }

    pub fn builder(options: impl Into<OptionsSource<S>>) -> GraphqlHttpBuilder<S> {
        GraphqlHttpBuilder {
            options: options.into(),
            body_decoder: None,
            page_renderer: None,
        }
    }

    /// A router serving this endpoint on `path` alone.
    pub fn router(self, path: &str) -> axum::Router {
        axum::Router::new().route_service(path, self)
    }

    /// Always produces exactly one response, failures included.
    pub async fn handle(&self, request: http::Request<Body>) -> http::Response<Body> {
        let span = tracing::info_span!(
            "graphql-http",
            method = %request.method(),
            uri = %request.uri(),
        );

        self.process(request).instrument(span).await
    }

    async fn process(&self, request: http::Request<Body>) -> http::Response<Body> {
        let (parts, body) = request.into_parts();

        let options = match self.inner.options.resolve(&parts).await {
            Ok(options) => options,
            Err(error) => {
                let emission = Emission {
                    pretty: false,
                    graphiql: false,
                    format_error: None,
                    params: None,
                };
                return emit(
                    emission,
                    Err(RequestError::from(error).into()),
                    self.inner.page_renderer.as_ref(),
                );
            }
        };

        let mut emission = Emission {
            pretty: options.pretty,
            graphiql: false,
            format_error: options.format_error.as_ref(),
            params: None,
        };

        if parts.method != http::Method::GET && parts.method != http::Method::POST {
            return emit(
                emission,
                Err(RequestError::MethodNotAllowed.into()),
                self.inner.page_renderer.as_ref(),
            );
        }

        let body = match self.inner.body_decoder.decode(&parts, body).await {
            Ok(body) => body,
            Err(error) => {
                return emit(
                    emission,
                    Err(RequestError::from(error).into()),
                    self.inner.page_renderer.as_ref(),
                );
            }
        };

        let url = url_fields(&parts.uri);
        emission.graphiql =
            negotiation::can_display_graphiql(options.graphiql, has_raw(&url, &body), accept(&parts).as_deref());

        let params = match RequestParams::extract(&url, &body) {
            Ok(params) => params,
            Err(error) => {
                return emit(
                    emission,
                    Err(Failure::Terminal(error)),
                    self.inner.page_renderer.as_ref(),
                );
            }
        };

        let outcome = pipeline::run(&options, &parts.method, &params, emission.graphiql).await;
        emission.params = Some(&params);

        emit(emission, outcome, self.inner.page_renderer.as_ref())
    }
}

/// Every `Accept` header of the request, as a single list.
fn accept(parts: &http::request::Parts) -> Option<String> {
    let values = parts
        .headers
        .get_all(http::header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>();

    (!values.is_empty()).then(|| values.join(", "))
}

impl<S: Schema> tower::Service<http::Request<Body>> for GraphqlHttp<S> {
    type Response = http::Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        let service = self.clone();
        async move { Ok(service.handle(request).await) }.boxed()
    }
}
