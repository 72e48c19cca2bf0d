use std::{future::Future, sync::Arc};

use crate::GraphqlError;

pub type Variables = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

/// Everything needed to execute a parsed and validated document.
pub struct ExecutionRequest<'a, S: Schema + ?Sized> {
    pub document: &'a S::Document,
    pub root_value: Option<&'a S::RootValue>,
    pub context: Option<&'a S::Context>,
    pub variables: Option<&'a Variables>,
    pub operation_name: Option<&'a str>,
}

/// Outcome of a GraphQL execution attempt. `data` distinguishes an absent key (`None`) from an
/// explicit `null`.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub data: Option<serde_json::Value>,
    pub errors: Vec<GraphqlError>,
}

impl Response {
    pub fn from_data(data: serde_json::Value) -> Self {
        Response {
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

/// The GraphQL library surface the request pipeline relies on: parsing, validation, operation
/// lookup and execution. A `Schema` is shared across requests and must not hold request state.
pub trait Schema: Send + Sync + 'static {
    type Document: Send + Sync;
    type Context: Send + Sync + 'static;
    type RootValue: Send + Sync + 'static;
    type ValidationRule: ?Sized + Send + Sync + 'static;

    /// Parses the query, failing with a single syntax error.
    fn parse(&self, source: &str) -> Result<Self::Document, GraphqlError>;

    /// Validates the document with the default rule set followed by `extra_rules`. An empty list
    /// means the document is valid.
    fn validate(&self, document: &Self::Document, extra_rules: &[Arc<Self::ValidationRule>]) -> Vec<GraphqlError>;

    /// Type of the operation `operation_name` selects, or of the only operation of the document
    /// when no name is given. `None` if no single operation matches.
    fn operation_type(&self, document: &Self::Document, operation_name: Option<&str>) -> Option<OperationType>;

    /// Executes a validated document. Field errors belong to the returned response, an `Err` is
    /// reserved for failures to set up the execution itself (unknown operation, bad variables...).
    fn execute<'a>(
        &'a self,
        request: ExecutionRequest<'a, Self>,
    ) -> impl Future<Output = Result<Response, GraphqlError>> + Send + 'a;
}
