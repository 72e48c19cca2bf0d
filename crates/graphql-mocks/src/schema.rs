use std::sync::Arc;

use async_graphql_parser::types::ExecutableDocument;
use graphql_http::{ErrorCode, ExecutionRequest, GraphqlError, Location, OperationType, Response};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    execution::Executor,
    validation::{default_rules, ValidationContext, ValidationRule},
};

pub type Arguments = serde_json::Map<String, Value>;

pub type Resolver = Arc<dyn Fn(&ResolverContext<'_>) -> Result<Value, String> + Send + Sync>;

/// What a resolver gets to compute the value of a field.
pub struct ResolverContext<'a> {
    /// Value of the parent object, or the root value for root fields.
    pub parent: &'a Value,
    pub arguments: &'a Arguments,
    pub context: Option<&'a Value>,
}

/// Named type of a field, possibly wrapped in a list. Nullability is not tracked, every field is
/// nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub list: bool,
}

impl FieldType {
    /// Parses `Tea`, `Tea!`, `[Tea]` or `[Tea!]!`.
    pub fn parse(ty: &str) -> Self {
        let ty = ty.trim().trim_end_matches('!');
        match ty.strip_prefix('[').and_then(|ty| ty.strip_suffix(']')) {
            Some(inner) => FieldType {
                name: inner.trim().trim_end_matches('!').to_string(),
                list: true,
            },
            None => FieldType {
                name: ty.to_string(),
                list: false,
            },
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.list {
            write!(f, "[{}]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[derive(Clone)]
pub struct FieldDefinition {
    pub ty: FieldType,
    resolver: Option<Resolver>,
}

impl FieldDefinition {
    pub fn new(ty: &str) -> Self {
        FieldDefinition {
            ty: FieldType::parse(ty),
            resolver: None,
        }
    }

    /// Without a resolver, the field reads the property of the same name on its parent.
    #[must_use]
    pub fn resolver(
        mut self,
        resolver: impl Fn(&ResolverContext<'_>) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub(crate) fn resolve(&self, name: &str, ctx: &ResolverContext<'_>) -> Result<Value, String> {
        match &self.resolver {
            Some(resolver) => resolver(ctx),
            None => Ok(ctx.parent.get(name).cloned().unwrap_or(Value::Null)),
        }
    }
}

#[derive(Clone)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectType {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// A small in-memory GraphQL schema made of object types and built-in scalars.
///
/// ```ignore
/// let schema = MockSchema::builder()
///     .object(ObjectType::new("Query").field("hello", FieldDefinition::new("String")))
///     .query("Query")
///     .build();
/// ```
pub struct MockSchema {
    query: String,
    mutation: Option<String>,
    subscription: Option<String>,
    types: IndexMap<String, ObjectType>,
    default_rules: Vec<Arc<dyn ValidationRule>>,
}

impl MockSchema {
    pub fn builder() -> MockSchemaBuilder {
        MockSchemaBuilder::default()
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.is_scalar(name) || self.types.contains_key(name)
    }

    /// Root type of operations of the given kind, if the schema supports them.
    pub fn root(&self, operation_type: OperationType) -> Option<&ObjectType> {
        let name = match operation_type {
            OperationType::Query => Some(&self.query),
            OperationType::Mutation => self.mutation.as_ref(),
            OperationType::Subscription => self.subscription.as_ref(),
        }?;
        self.object(name)
    }
}

#[derive(Default)]
pub struct MockSchemaBuilder {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
    types: IndexMap<String, ObjectType>,
}

impl MockSchemaBuilder {
    #[must_use]
    pub fn object(mut self, object: ObjectType) -> Self {
        self.types.insert(object.name.clone(), object);
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>) -> Self {
        self.query = Some(name.into());
        self
    }

    #[must_use]
    pub fn mutation(mut self, name: impl Into<String>) -> Self {
        self.mutation = Some(name.into());
        self
    }

    #[must_use]
    pub fn subscription(mut self, name: impl Into<String>) -> Self {
        self.subscription = Some(name.into());
        self
    }

    /// The query root defaults to `Query`.
    pub fn build(self) -> MockSchema {
        MockSchema {
            query: self.query.unwrap_or_else(|| "Query".to_string()),
            mutation: self.mutation,
            subscription: self.subscription,
            types: self.types,
            default_rules: default_rules(),
        }
    }
}

pub(crate) fn operation_type_of(ty: async_graphql_parser::types::OperationType) -> OperationType {
    match ty {
        async_graphql_parser::types::OperationType::Query => OperationType::Query,
        async_graphql_parser::types::OperationType::Mutation => OperationType::Mutation,
        async_graphql_parser::types::OperationType::Subscription => OperationType::Subscription,
    }
}

impl graphql_http::Schema for MockSchema {
    type Document = ExecutableDocument;
    type Context = Value;
    type RootValue = Value;
    type ValidationRule = dyn ValidationRule;

    fn parse(&self, source: &str) -> Result<ExecutableDocument, GraphqlError> {
        async_graphql_parser::parse_query(source).map_err(|error| {
            let locations = error
                .positions()
                .map(|pos| Location::new(pos.line, pos.column))
                .collect::<Vec<_>>();
            GraphqlError::new(format!("Syntax Error: {error}"), ErrorCode::OperationParsingError).with_locations(locations)
        })
    }

    fn validate(&self, document: &ExecutableDocument, extra_rules: &[Arc<dyn ValidationRule>]) -> Vec<GraphqlError> {
        let ctx = ValidationContext::new(self, document);
        self.default_rules
            .iter()
            .chain(extra_rules)
            .flat_map(|rule| rule.validate(&ctx))
            .collect()
    }

    fn operation_type(&self, document: &ExecutableDocument, operation_name: Option<&str>) -> Option<OperationType> {
        let mut operations = document.operations.iter();
        let operation = match operation_name {
            Some(name) => operations.find(|(candidate, _)| candidate.map(|candidate| candidate.as_str()) == Some(name)),
            None => match (operations.next(), operations.next()) {
                (Some(operation), None) => Some(operation),
                _ => None,
            },
        }?;

        Some(operation_type_of(operation.1.node.ty))
    }

    fn execute<'a>(
        &'a self,
        request: ExecutionRequest<'a, Self>,
    ) -> impl std::future::Future<Output = Result<Response, GraphqlError>> + Send + 'a {
        async move { Executor::prepare(self, &request).map(Executor::run) }
    }
}
