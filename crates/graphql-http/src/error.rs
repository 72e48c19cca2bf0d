use std::{borrow::Cow, sync::Arc};

use http::{HeaderValue, StatusCode};

use crate::OperationType;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a raw error into the view that is serialized in the response. Called exactly once per
/// error, right before emission.
pub type FormatErrorFn = Arc<dyn Fn(GraphqlError) -> ErrorView + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    MethodNotAllowed,
    InternalServerError,
    // Operation preparation phases
    OperationParsingError,
    OperationValidationError,
    OperationExecutionError,
    // Returned by resolvers, inside a successful outcome.
    FieldError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(field: &str) -> Self {
        PathSegment::Field(field.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// An error as produced by any stage of the request, before formatting.
#[derive(Debug, Clone)]
pub struct GraphqlError {
    pub message: Cow<'static, str>,
    pub code: ErrorCode,
    pub locations: Vec<Location>,
    pub path: Vec<PathSegment>,
    // Serialized as a map, but kept as a Vec for efficiency.
    pub extensions: Vec<(Cow<'static, str>, serde_json::Value)>,
}

impl GraphqlError {
    pub fn new(message: impl Into<Cow<'static, str>>, code: ErrorCode) -> Self {
        GraphqlError {
            message: message.into(),
            code,
            locations: Vec::new(),
            path: Vec::new(),
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl IntoIterator<Item = PathSegment>) -> Self {
        self.path = path.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.push((key.into(), value.into()));
        self
    }
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

/// Serializable representation of a single error.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorView {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// The default formatter: message, locations, path and extensions. The error code stays internal.
impl From<GraphqlError> for ErrorView {
    fn from(error: GraphqlError) -> Self {
        ErrorView {
            message: error.message.into_owned(),
            locations: error.locations,
            path: (!error.path.is_empty()).then_some(error.path),
            extensions: error
                .extensions
                .into_iter()
                .map(|(key, value)| (key.into_owned(), value))
                .collect(),
        }
    }
}

/// A failure that aborts the request before any outcome is produced.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("GraphQL only supports GET and POST requests.")]
    MethodNotAllowed,
    #[error(transparent)]
    Body(#[from] BodyError),
    #[error("Variables are invalid JSON.")]
    InvalidVariables(#[source] serde_json::Error),
    #[error("Variables must be an object.")]
    VariablesNotAnObject,
    #[error("Must provide query string.")]
    MissingQuery,
    #[error("Can only perform a {0} operation from a POST request.")]
    OperationNotAllowed(OperationType),
}

impl RequestError {
    /// The status attached to this failure, if any. Unclassified failures get a 500.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Configuration(_) => None,
            RequestError::Body(error) => error.status(),
            RequestError::MethodNotAllowed | RequestError::OperationNotAllowed(_) => {
                Some(StatusCode::METHOD_NOT_ALLOWED)
            }
            RequestError::InvalidVariables(_) | RequestError::VariablesNotAnObject | RequestError::MissingQuery => {
                Some(StatusCode::BAD_REQUEST)
            }
        }
    }

    /// Value of the `Allow` header to send along the failure.
    pub fn allow(&self) -> Option<HeaderValue> {
        match self {
            RequestError::MethodNotAllowed => Some(HeaderValue::from_static("GET, POST")),
            RequestError::OperationNotAllowed(_) => Some(HeaderValue::from_static("POST")),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self.status() {
            Some(StatusCode::METHOD_NOT_ALLOWED) => ErrorCode::MethodNotAllowed,
            Some(status) if status.is_client_error() => ErrorCode::BadRequest,
            _ => ErrorCode::InternalServerError,
        }
    }
}

impl From<RequestError> for GraphqlError {
    fn from(error: RequestError) -> Self {
        let code = error.code();
        GraphqlError::new(error.to_string(), code)
    }
}

/// The options could not be turned into a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("GraphQL option function must return an options object: {0}")]
    InvalidOptions(#[source] BoxError),
    #[error("GraphQL options must contain a schema.")]
    MissingSchema,
}

/// Failure of a [`BodyDecoder`](crate::BodyDecoder).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BodyError {
    status: Option<StatusCode>,
    message: Cow<'static, str>,
}

impl BodyError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        BodyError {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A failure without a status, reported as a 500.
    pub fn opaque(message: impl Into<Cow<'static, str>>) -> Self {
        BodyError {
            status: None,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unsupported_media_type(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
