//! Parsing, validation and execution of a single GraphQL request.
//!
//! Each stage either hands its result to the next one or stops the pipeline with a [`Failure`].
//! Errors in the GraphQL content itself are recovered into the outcome, so GraphiQL can still
//! display the query next to them. Protocol errors are terminal.

use crate::{
    ExecutionRequest, GraphqlError, OperationType, RequestError, RequestParams, ResolvedOptions, Response, Schema,
};

#[derive(Debug)]
pub(crate) enum Failure {
    /// Aborts the request, the status comes from the error.
    Terminal(RequestError),
    /// Becomes the outcome itself, with a 400.
    Recovered(Vec<GraphqlError>),
}

impl From<RequestError> for Failure {
    fn from(error: RequestError) -> Self {
        Failure::Terminal(error)
    }
}

/// `Ok(None)` means execution was skipped in favor of GraphiQL.
pub(crate) type Outcome = Result<Option<Response>, Failure>;

pub(crate) async fn run<S: Schema>(
    options: &ResolvedOptions<S>,
    method: &http::Method,
    params: &RequestParams,
    graphiql: bool,
) -> Outcome {
    let Some(query) = params.query.as_deref() else {
        // GraphiQL will let the user write one.
        if graphiql {
            return Ok(None);
        }
        return Err(RequestError::MissingQuery.into());
    };

    let document = parse(options, query)?;
    validate(options, &document)?;

    if *method == http::Method::GET {
        if let Some(operation_type) = mutation_over_get(options, &document, params) {
            // Let the user run it from GraphiQL, which always POSTs.
            if graphiql {
                return Ok(None);
            }
            return Err(RequestError::OperationNotAllowed(operation_type).into());
        }
    }

    execute(options, &document, params).await.map(Some)
}

fn parse<S: Schema>(options: &ResolvedOptions<S>, query: &str) -> Result<S::Document, Failure> {
    options.schema.parse(query).map_err(|error| {
        tracing::debug!("Syntax error: {error}");
        Failure::Recovered(vec![error])
    })
}

fn validate<S: Schema>(options: &ResolvedOptions<S>, document: &S::Document) -> Result<(), Failure> {
    let errors = options.schema.validate(document, &options.validation_rules);
    if errors.is_empty() {
        return Ok(());
    }

    tracing::debug!("Validation failed with {} error(s)", errors.len());
    Err(Failure::Recovered(errors))
}

/// Only queries may run over GET.
fn mutation_over_get<S: Schema>(
    options: &ResolvedOptions<S>,
    document: &S::Document,
    params: &RequestParams,
) -> Option<OperationType> {
    options
        .schema
        .operation_type(document, params.operation_name.as_deref())
        .filter(|operation_type| *operation_type != OperationType::Query)
}

async fn execute<S: Schema>(
    options: &ResolvedOptions<S>,
    document: &S::Document,
    params: &RequestParams,
) -> Result<Response, Failure> {
    let request = ExecutionRequest {
        document,
        root_value: options.root_value.as_deref(),
        context: options.context.as_deref(),
        variables: params.variables.as_ref(),
        operation_name: params.operation_name.as_deref(),
    };

    options.schema.execute(request).await.map_err(|error| {
        tracing::debug!("Failed to set up execution: {error}");
        Failure::Recovered(vec![error])
    })
}
