//! An in-memory GraphQL engine for tests and demos.
//!
//! Schemas are built from object types whose fields either read the property of the same name on
//! their parent value or run a resolver. Only built-in scalars are supported and every field is
//! nullable. [`tea_shop::schema`] is a ready-made example.
#![cfg_attr(test, allow(unused_crate_dependencies))]

mod execution;
mod schema;
pub mod tea_shop;
pub mod validation;

pub use schema::{
    Arguments, FieldDefinition, FieldType, MockSchema, MockSchemaBuilder, ObjectType, Resolver, ResolverContext,
};
pub use validation::{MaxDepth, ValidationRule};
