use std::{future::Future, sync::Arc};

use futures_util::{future::BoxFuture, FutureExt};

use crate::{BoxError, ConfigurationError, ErrorView, FormatErrorFn, GraphqlError, Schema};

/// Configuration of the GraphQL endpoint.
///
/// ```ignore
/// let options = Options::new(schema)
///     .with_pretty(true)
///     .with_graphiql(true)
///     .with_validation_rule(Arc::new(MaxDepth::new(10)));
/// ```
pub struct Options<S: Schema> {
    schema: Option<Arc<S>>,
    context: Option<Arc<S::Context>>,
    root_value: Option<Arc<S::RootValue>>,
    pretty: bool,
    graphiql: bool,
    format_error: Option<FormatErrorFn>,
    validation_rules: Vec<Arc<S::ValidationRule>>,
}

impl<S: Schema> Default for Options<S> {
    fn default() -> Self {
        Options {
            schema: None,
            context: None,
            root_value: None,
            pretty: false,
            graphiql: false,
            format_error: None,
            validation_rules: Vec::new(),
        }
    }
}

impl<S: Schema> Clone for Options<S> {
    fn clone(&self) -> Self {
        Options {
            schema: self.schema.clone(),
            context: self.context.clone(),
            root_value: self.root_value.clone(),
            pretty: self.pretty,
            graphiql: self.graphiql,
            format_error: self.format_error.clone(),
            validation_rules: self.validation_rules.clone(),
        }
    }
}

impl<S: Schema> Options<S> {
    pub fn new(schema: impl Into<Arc<S>>) -> Self {
        Options::default().with_schema(schema)
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<Arc<S>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Value passed to every resolver of the execution.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<Arc<S::Context>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_root_value(mut self, root_value: impl Into<Arc<S::RootValue>>) -> Self {
        self.root_value = Some(root_value.into());
        self
    }

    /// Indent JSON responses with two spaces.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serve GraphiQL to clients preferring HTML over JSON.
    #[must_use]
    pub fn with_graphiql(mut self, graphiql: bool) -> Self {
        self.graphiql = graphiql;
        self
    }

    #[must_use]
    pub fn with_format_error(mut self, format_error: impl Fn(GraphqlError) -> ErrorView + Send + Sync + 'static) -> Self {
        self.format_error = Some(Arc::new(format_error));
        self
    }

    /// Adds a rule run after the schema's default validation rules. Rules run in insertion order.
    #[must_use]
    pub fn with_validation_rule(mut self, rule: Arc<S::ValidationRule>) -> Self {
        self.validation_rules.push(rule);
        self
    }

    fn resolve(self) -> Result<ResolvedOptions<S>, ConfigurationError> {
        let Some(schema) = self.schema else {
            return Err(ConfigurationError::MissingSchema);
        };

        Ok(ResolvedOptions {
            schema,
            context: self.context,
            root_value: self.root_value,
            pretty: self.pretty,
            graphiql: self.graphiql,
            format_error: self.format_error,
            validation_rules: self.validation_rules,
        })
    }
}

/// Options of a single request, guaranteed to have a schema.
pub struct ResolvedOptions<S: Schema> {
    pub schema: Arc<S>,
    pub context: Option<Arc<S::Context>>,
    pub root_value: Option<Arc<S::RootValue>>,
    pub pretty: bool,
    pub graphiql: bool,
    pub format_error: Option<FormatErrorFn>,
    pub validation_rules: Vec<Arc<S::ValidationRule>>,
}

type OptionsFn<S> = dyn Fn(&http::request::Parts) -> BoxFuture<'static, Result<Options<S>, BoxError>> + Send + Sync;

/// Where the options of a request come from: a fixed value or a function of the request.
pub enum OptionsSource<S: Schema> {
    Static(Options<S>),
    Dynamic(Arc<OptionsFn<S>>),
}

impl<S: Schema> Clone for OptionsSource<S> {
    fn clone(&self) -> Self {
        match self {
            OptionsSource::Static(options) => OptionsSource::Static(options.clone()),
            OptionsSource::Dynamic(f) => OptionsSource::Dynamic(f.clone()),
        }
    }
}

impl<S: Schema> From<Options<S>> for OptionsSource<S> {
    fn from(options: Options<S>) -> Self {
        OptionsSource::Static(options)
    }
}

impl<S: Schema> OptionsSource<S> {
    /// Options computed asynchronously for each request.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(&http::request::Parts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Options<S>, BoxError>> + Send + 'static,
    {
        OptionsSource::Dynamic(Arc::new(move |parts| f(parts).boxed()))
    }

    /// Options computed synchronously for each request.
    pub fn from_sync_fn<F>(f: F) -> Self
    where
        F: Fn(&http::request::Parts) -> Result<Options<S>, BoxError> + Send + Sync + 'static,
    {
        OptionsSource::Dynamic(Arc::new(move |parts| futures_util::future::ready(f(parts)).boxed()))
    }

    pub async fn resolve(&self, parts: &http::request::Parts) -> Result<ResolvedOptions<S>, ConfigurationError> {
        let options = match self {
            OptionsSource::Static(options) => options.clone(),
            OptionsSource::Dynamic(f) => f(parts).await.map_err(ConfigurationError::InvalidOptions)?,
        };

        options.resolve()
    }
}
