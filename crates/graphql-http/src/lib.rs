//! GraphQL over HTTP.
//!
//! Turns an HTTP request into a GraphQL execution and its outcome back into an HTTP response,
//! either JSON or a GraphiQL page when a browser asks for one. Requests flow through these
//! stages, any of which may short-circuit to the response:
//!
//! 1. options resolution, static or computed from the request,
//! 2. the method gate and body decoding,
//! 3. parameter extraction from the URL and the body,
//! 4. parsing, validation and execution against a [`Schema`],
//! 5. error formatting and response emission.
//!
//! The GraphQL engine itself is provided through the [`Schema`] trait.
#![cfg_attr(test, allow(unused_crate_dependencies))]

mod body;
mod error;
pub mod negotiation;
mod options;
mod page;
mod params;
mod pipeline;
mod response;
mod schema;
mod service;

pub use body::{BodyDecoder, StandardBodyDecoder, DEFAULT_BODY_LIMIT};
pub use error::{
    BodyError, BoxError, ConfigurationError, ErrorCode, ErrorView, FormatErrorFn, GraphqlError, Location, PathSegment,
    RequestError,
};
pub use options::{Options, OptionsSource, ResolvedOptions};
pub use page::{GraphiqlPage, GraphiqlRenderer, PageRenderer, RenderError};
pub use params::{has_raw, url_fields, Fields, RequestParams};
pub use response::FormattedResponse;
pub use schema::{ExecutionRequest, OperationType, Response, Schema, Variables};
pub use service::{GraphqlHttp, GraphqlHttpBuilder};
