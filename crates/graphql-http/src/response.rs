use axum::body::Body;
use headers::{ContentLength, ContentType, HeaderMapExt};
use http::StatusCode;
use serde_json::Value;

use crate::{
    pipeline::{Failure, Outcome},
    ErrorView, FormatErrorFn, GraphiqlPage, GraphqlError, PageRenderer, RequestParams,
};

/// A response body ready to be serialized, every error being formatted.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FormattedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorView>,
}

/// How the outcome of a request is written out.
pub(crate) struct Emission<'a> {
    pub pretty: bool,
    pub graphiql: bool,
    pub format_error: Option<&'a FormatErrorFn>,
    /// Absent when the parameters could not be extracted.
    pub params: Option<&'a RequestParams>,
}

impl Emission<'_> {
    fn format(&self, errors: Vec<GraphqlError>) -> Vec<ErrorView> {
        match self.format_error {
            Some(format_error) => errors.into_iter().map(format_error.as_ref()).collect(),
            None => errors.into_iter().map(ErrorView::from).collect(),
        }
    }
}

pub(crate) fn emit(emission: Emission<'_>, outcome: Outcome, renderer: &dyn PageRenderer) -> http::Response<Body> {
    let mut headers = http::HeaderMap::new();

    let (status, response) = match outcome {
        Ok(response) => (
            StatusCode::OK,
            response.map(|response| FormattedResponse {
                data: response.data,
                errors: emission.format(response.errors),
            }),
        ),
        Err(Failure::Recovered(errors)) => (
            StatusCode::BAD_REQUEST,
            Some(FormattedResponse {
                data: None,
                errors: emission.format(errors),
            }),
        ),
        Err(Failure::Terminal(error)) => {
            let status = error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_client_error() {
                tracing::warn!("Rejected request: {error}");
            } else {
                tracing::error!("Request failed: {error}");
            }

            if let Some(allow) = error.allow() {
                headers.insert(http::header::ALLOW, allow);
            }

            (
                status,
                Some(FormattedResponse {
                    data: None,
                    errors: emission.format(vec![error.into()]),
                }),
            )
        }
    };

    let body = if emission.graphiql {
        let params = emission.params;
        let page = GraphiqlPage {
            query: params.and_then(|params| params.query.as_deref()),
            variables: params.and_then(|params| params.variables.as_ref()),
            operation_name: params.and_then(|params| params.operation_name.as_deref()),
            result: response.as_ref(),
        };

        match renderer.render(&page) {
            Ok(html) => {
                headers.typed_insert(ContentType::html());
                html.into_bytes()
            }
            Err(err) => {
                tracing::error!("Failed to render GraphiQL: {err}");
                return internal_server_error();
            }
        }
    } else {
        let response = response.unwrap_or_default();
        let serialized = if emission.pretty {
            serde_json::to_vec_pretty(&response)
        } else {
            serde_json::to_vec(&response)
        };

        match serialized {
            Ok(json) => {
                headers.typed_insert(ContentType::json());
                json
            }
            Err(err) => {
                tracing::error!("Failed to serialize response: {err}");
                return internal_server_error();
            }
        }
    };

    build(status, headers, body)
}

fn internal_server_error() -> http::Response<Body> {
    let mut headers = http::HeaderMap::new();
    headers.typed_insert(ContentType::json());
    let body = br#"{"errors":[{"message":"Internal server error"}]}"#.to_vec();
    build(StatusCode::INTERNAL_SERVER_ERROR, headers, body)
}

fn build(status: StatusCode, mut headers: http::HeaderMap, body: Vec<u8>) -> http::Response<Body> {
    headers.typed_insert(ContentLength(body.len() as u64));

    let mut response = http::Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
