//! Document validation.
//!
//! Rules see a flattened view of the document: every field selection, with the type it is
//! selected on and its depth, along with every fragment spread and type condition.

use std::{collections::HashSet, sync::Arc};

use async_graphql_parser::{
    types::{
        BaseType, ExecutableDocument, Field, FragmentSpread, OperationType, Selection, SelectionSet, Type,
    },
    Positioned,
};
use async_graphql_value::Name;
use graphql_http::{ErrorCode, GraphqlError, Location};

use crate::{FieldDefinition, MockSchema, ObjectType};

pub trait ValidationRule: Send + Sync {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError>;
}

pub(crate) fn default_rules() -> Vec<Arc<dyn ValidationRule>> {
    vec![
        Arc::new(KnownOperationTypes),
        Arc::new(KnownFragmentNames),
        Arc::new(KnownTypeNames),
        Arc::new(FieldsOnCorrectType),
        Arc::new(ScalarLeafs),
    ]
}

fn validation_error(message: String, pos: async_graphql_parser::Pos) -> GraphqlError {
    GraphqlError::new(message, ErrorCode::OperationValidationError).with_location(Location::new(pos.line, pos.column))
}

/// A field selection, fragments being inlined.
pub struct VisitedField<'a> {
    pub field: &'a Positioned<Field>,
    /// `None` when the parent type is unknown.
    pub parent: Option<&'a ObjectType>,
    pub definition: Option<&'a FieldDefinition>,
    /// Root fields have a depth of 1.
    pub depth: usize,
}

pub struct ValidationContext<'a> {
    pub schema: &'a MockSchema,
    pub document: &'a ExecutableDocument,
    pub fields: Vec<VisitedField<'a>>,
    pub spreads: Vec<&'a Positioned<FragmentSpread>>,
    pub type_conditions: Vec<&'a Positioned<Name>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(schema: &'a MockSchema, document: &'a ExecutableDocument) -> Self {
        let mut ctx = ValidationContext {
            schema,
            document,
            fields: Vec::new(),
            spreads: Vec::new(),
            type_conditions: Vec::new(),
        };

        for fragment in document.fragments.values() {
            ctx.type_conditions.push(&fragment.node.type_condition.node.on);
        }

        for (_, operation) in document.operations.iter() {
            let root = schema.root(crate::schema::operation_type_of(operation.node.ty));
            ctx.walk(&operation.node.selection_set.node, root, 0, &mut HashSet::new());
        }

        ctx
    }

    fn walk(
        &mut self,
        selection_set: &'a SelectionSet,
        parent: Option<&'a ObjectType>,
        depth: usize,
        visiting: &mut HashSet<&'a str>,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let definition = parent.and_then(|parent| parent.fields.get(field.node.name.node.as_str()));
                    self.fields.push(VisitedField {
                        field,
                        parent,
                        definition,
                        depth: depth + 1,
                    });

                    let child = definition.and_then(|definition| self.schema.object(&definition.ty.name));
                    self.walk(&field.node.selection_set.node, child, depth + 1, visiting);
                }
                Selection::FragmentSpread(spread) => {
                    self.spreads.push(spread);

                    let name = spread.node.fragment_name.node.as_str();
                    let Some(fragment) = self.document.fragments.get(&spread.node.fragment_name.node) else {
                        continue;
                    };
                    // Cycles are not reported, only cut.
                    if !visiting.insert(name) {
                        continue;
                    }
                    let ty = self.schema.object(&fragment.node.type_condition.node.on.node);
                    self.walk(&fragment.node.selection_set.node, ty, depth, visiting);
                    visiting.remove(name);
                }
                Selection::InlineFragment(fragment) => {
                    let ty = match &fragment.node.type_condition {
                        Some(condition) => {
                            self.type_conditions.push(&condition.node.on);
                            self.schema.object(&condition.node.on.node)
                        }
                        None => parent,
                    };
                    self.walk(&fragment.node.selection_set.node, ty, depth, visiting);
                }
            }
        }
    }
}

pub struct KnownOperationTypes;

impl ValidationRule for KnownOperationTypes {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        ctx.document
            .operations
            .iter()
            .filter_map(|(_, operation)| {
                let ty = crate::schema::operation_type_of(operation.node.ty);
                if ctx.schema.root(ty).is_some() {
                    return None;
                }
                let kind = match operation.node.ty {
                    OperationType::Query => "queries",
                    OperationType::Mutation => "mutations",
                    OperationType::Subscription => "subscriptions",
                };
                Some(validation_error(
                    format!("Schema is not configured for {kind}."),
                    operation.pos,
                ))
            })
            .collect()
    }
}

pub struct KnownFragmentNames;

impl ValidationRule for KnownFragmentNames {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        ctx.spreads
            .iter()
            .filter(|spread| !ctx.document.fragments.contains_key(&spread.node.fragment_name.node))
            .map(|spread| {
                validation_error(
                    format!("Unknown fragment \"{}\".", spread.node.fragment_name.node),
                    spread.pos,
                )
            })
            .collect()
    }
}

pub struct KnownTypeNames;

impl ValidationRule for KnownTypeNames {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        let variable_types = ctx
            .document
            .operations
            .iter()
            .flat_map(|(_, operation)| &operation.node.variable_definitions)
            .map(|variable| (named_type(&variable.node.var_type.node), variable.node.var_type.pos));

        ctx.type_conditions
            .iter()
            .map(|condition| (condition.node.as_str(), condition.pos))
            .chain(variable_types)
            .filter(|(name, _)| !ctx.schema.has_type(name))
            .map(|(name, pos)| validation_error(format!("Unknown type \"{name}\"."), pos))
            .collect()
    }
}

fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => named_type(inner),
    }
}

pub struct FieldsOnCorrectType;

impl ValidationRule for FieldsOnCorrectType {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        ctx.fields
            .iter()
            .filter_map(|visited| {
                let parent = visited.parent?;
                let name = visited.field.node.name.node.as_str();
                if visited.definition.is_some() || name == "__typename" {
                    return None;
                }
                Some(validation_error(
                    format!("Cannot query field \"{name}\" on type \"{}\".", parent.name),
                    visited.field.pos,
                ))
            })
            .collect()
    }
}

pub struct ScalarLeafs;

impl ValidationRule for ScalarLeafs {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        ctx.fields
            .iter()
            .filter_map(|visited| {
                let definition = visited.definition?;
                let name = visited.field.node.name.node.as_str();
                let has_selection = !visited.field.node.selection_set.node.items.is_empty();
                let is_leaf = ctx.schema.object(&definition.ty.name).is_none();

                let message = match (is_leaf, has_selection) {
                    (true, true) => format!(
                        "Field \"{name}\" must not have a selection since type \"{}\" has no subfields.",
                        definition.ty
                    ),
                    (false, false) => format!(
                        "Field \"{name}\" of type \"{}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?",
                        definition.ty
                    ),
                    _ => return None,
                };
                Some(validation_error(message, visited.field.pos))
            })
            .collect()
    }
}

/// Rejects documents selecting fields deeper than a limit.
pub struct MaxDepth {
    limit: usize,
}

impl MaxDepth {
    pub fn new(limit: usize) -> Self {
        MaxDepth { limit }
    }
}

impl ValidationRule for MaxDepth {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphqlError> {
        ctx.fields
            .iter()
            .filter(|visited| visited.depth == self.limit + 1)
            .map(|visited| {
                validation_error(
                    format!(
                        "Field \"{}\" exceeds the maximum query depth of {}.",
                        visited.field.node.name.node, self.limit
                    ),
                    visited.field.pos,
                )
            })
            .collect()
    }
}
