use std::collections::HashSet;

use async_graphql_parser::{
    types::{ExecutableDocument, Field, OperationDefinition, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::{ConstValue, Name};
use graphql_http::{ErrorCode, ExecutionRequest, GraphqlError, Location, PathSegment, Response, Variables};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{schema::operation_type_of, Arguments, FieldType, MockSchema, ObjectType, ResolverContext};

fn location(pos: async_graphql_parser::Pos) -> Location {
    Location::new(pos.line, pos.column)
}

fn execution_error(message: String) -> GraphqlError {
    GraphqlError::new(message, ErrorCode::OperationExecutionError)
}

/// Executes one operation of a validated document. Fields resolve sequentially, and a failing
/// field becomes `null` with an error pointing at it.
pub(crate) struct Executor<'a> {
    schema: &'a MockSchema,
    document: &'a ExecutableDocument,
    operation: &'a OperationDefinition,
    root: &'a ObjectType,
    root_value: Value,
    context: Option<&'a Value>,
    variables: Variables,
    errors: Vec<GraphqlError>,
}

type GroupedFields<'a> = IndexMap<&'a str, Vec<&'a Positioned<Field>>>;

impl<'a> Executor<'a> {
    /// Fails when no operation can be selected or when variables are missing.
    pub(crate) fn prepare(schema: &'a MockSchema, request: &ExecutionRequest<'a, MockSchema>) -> Result<Self, GraphqlError> {
        let document = request.document;
        let operation = select_operation(document, request.operation_name)?;

        let root = schema
            .root(operation_type_of(operation.ty))
            .ok_or_else(|| execution_error(format!("Schema is not configured to execute {} operation.", operation.ty)))?;

        let variables = coerce_variables(operation, request.variables)?;

        Ok(Executor {
            schema,
            document,
            operation,
            root,
            root_value: request.root_value.cloned().unwrap_or(Value::Null),
            context: request.context,
            variables,
            errors: Vec::new(),
        })
    }

    pub(crate) fn run(mut self) -> Response {
        let root_value = std::mem::take(&mut self.root_value);
        let mut fields = GroupedFields::new();
        self.collect_fields(self.root, &self.operation.selection_set.node, &mut fields, &mut HashSet::new());

        let data = self.execute_fields(self.root, &root_value, &fields, &mut Vec::new());
        tracing::debug!("Executed operation with {} field error(s)", self.errors.len());

        Response {
            data: Some(data),
            errors: self.errors,
        }
    }

    fn collect_fields(
        &self,
        ty: &ObjectType,
        selection_set: &'a SelectionSet,
        fields: &mut GroupedFields<'a>,
        visited_fragments: &mut HashSet<&'a str>,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    fields
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    if !visited_fragments.insert(name) {
                        continue;
                    }
                    let Some(fragment) = self.document.fragments.get(&spread.node.fragment_name.node) else {
                        continue;
                    };
                    if fragment.node.type_condition.node.on.node.as_str() == ty.name {
                        self.collect_fields(ty, &fragment.node.selection_set.node, fields, visited_fragments);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let applies = fragment
                        .node
                        .type_condition
                        .as_ref()
                        .is_none_or(|condition| condition.node.on.node.as_str() == ty.name);
                    if applies {
                        self.collect_fields(ty, &fragment.node.selection_set.node, fields, visited_fragments);
                    }
                }
            }
        }
    }

    fn execute_fields(
        &mut self,
        ty: &'a ObjectType,
        parent: &Value,
        fields: &GroupedFields<'a>,
        path: &mut Vec<PathSegment>,
    ) -> Value {
        let mut object = serde_json::Map::with_capacity(fields.len());

        for (response_key, selections) in fields {
            path.push(PathSegment::from(*response_key));
            let value = self.execute_field(ty, parent, selections, path);
            path.pop();
            object.insert(response_key.to_string(), value);
        }

        Value::Object(object)
    }

    fn execute_field(
        &mut self,
        ty: &'a ObjectType,
        parent: &Value,
        selections: &[&'a Positioned<Field>],
        path: &mut Vec<PathSegment>,
    ) -> Value {
        let field = selections[0];
        let name = field.node.name.node.as_str();

        if name == "__typename" {
            return Value::String(ty.name.clone());
        }

        let Some(definition) = ty.fields.get(name) else {
            return Value::Null;
        };

        let resolved = self.arguments(&field.node).and_then(|arguments| {
            definition.resolve(
                name,
                &ResolverContext {
                    parent,
                    arguments: &arguments,
                    context: self.context,
                },
            )
        });

        match resolved {
            Ok(value) => self.complete(&definition.ty, definition.ty.list, selections, value, path),
            Err(message) => {
                self.field_error(message, field, path);
                Value::Null
            }
        }
    }

    fn complete(
        &mut self,
        ty: &FieldType,
        list: bool,
        selections: &[&'a Positioned<Field>],
        value: Value,
        path: &mut Vec<PathSegment>,
    ) -> Value {
        if value.is_null() {
            return value;
        }

        if list {
            let Value::Array(items) = value else {
                self.field_error(format!("Expected a list for type \"{ty}\"."), selections[0], path);
                return Value::Null;
            };

            return Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        path.push(PathSegment::from(index));
                        let item = self.complete(ty, false, selections, item, path);
                        path.pop();
                        item
                    })
                    .collect(),
            );
        }

        let Some(object) = self.schema.object(&ty.name) else {
            // Scalars are passed through.
            return value;
        };

        let mut fields = GroupedFields::new();
        for selection in selections {
            self.collect_fields(object, &selection.node.selection_set.node, &mut fields, &mut HashSet::new());
        }
        self.execute_fields(object, &value, &fields, path)
    }

    fn arguments(&self, field: &Field) -> Result<Arguments, String> {
        field
            .arguments
            .iter()
            .map(|(name, value)| {
                let value = value
                    .node
                    .clone()
                    .into_const_with(|variable| Ok::<_, serde_json::Error>(self.variable(&variable)))
                    .and_then(ConstValue::into_json)
                    .map_err(|err| format!("Invalid value for argument \"{}\": {err}", name.node))?;
                Ok((name.node.to_string(), value))
            })
            .collect()
    }

    fn variable(&self, name: &Name) -> ConstValue {
        self.variables
            .get(name.as_str())
            .cloned()
            .and_then(|value| ConstValue::from_json(value).ok())
            .unwrap_or(ConstValue::Null)
    }

    fn field_error(&mut self, message: String, field: &Positioned<Field>, path: &[PathSegment]) {
        tracing::debug!("Field error: {message}");
        self.errors.push(
            GraphqlError::new(message, ErrorCode::FieldError)
                .with_location(location(field.pos))
                .with_path(path.iter().cloned()),
        );
    }
}

fn select_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition, GraphqlError> {
    let mut operations = document.operations.iter();

    match operation_name {
        Some(name) => operations
            .find(|(candidate, _)| candidate.map(|candidate| candidate.as_str()) == Some(name))
            .map(|(_, operation)| &operation.node)
            .ok_or_else(|| execution_error(format!("Unknown operation named \"{name}\"."))),
        None => match (operations.next(), operations.next()) {
            (Some((_, operation)), None) => Ok(&operation.node),
            (Some(_), Some(_)) => Err(execution_error(
                "Must provide operation name if query contains multiple operations.".to_string(),
            )),
            (None, _) => Err(execution_error("Must provide an operation.".to_string())),
        },
    }
}

/// Applies defaults and checks required variables are provided. Values are not type-checked.
fn coerce_variables(operation: &OperationDefinition, provided: Option<&Variables>) -> Result<Variables, GraphqlError> {
    let mut variables = Variables::new();

    for definition in &operation.variable_definitions {
        let name = definition.node.name.node.as_str();
        let ty = &definition.node.var_type.node;

        match provided.and_then(|provided| provided.get(name)) {
            Some(Value::Null) if !ty.nullable => {
                return Err(execution_error(format!(
                    "Variable \"${name}\" of non-null type \"{ty}\" must not be null."
                ))
                .with_location(location(definition.pos)));
            }
            Some(value) => {
                variables.insert(name.to_string(), value.clone());
            }
            None => match &definition.node.default_value {
                Some(default) => {
                    let default = default.node.clone().into_json().map_err(|err| {
                        execution_error(format!("Invalid default value for variable \"${name}\": {err}"))
                    })?;
                    variables.insert(name.to_string(), default);
                }
                None if !ty.nullable => {
                    return Err(execution_error(format!(
                        "Variable \"${name}\" of required type \"{ty}\" was not provided."
                    ))
                    .with_location(location(definition.pos)));
                }
                None => {}
            },
        }
    }

    Ok(variables)
}
