//! ## Crate layout
//! - `core`: values, expression codecs, compilers, schema whitelist,
//!   permission model, access predicates and observability.
//! - `error`: the public error taxonomy.
//!
//! The free functions below are the stable entry points. Longer flows
//! (parse, validate, compile and scope in one call) live on
//! `core::session::AccessSession`.

pub use fieldgate_core as core;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin, ExpressionErrorKind, SchemaErrorKind};

use fieldgate_core::{
    acl::{AccessPredicateBuilder, ActorRef},
    config::DslConfig,
    error::EngineError,
    expr::{self, ExpressionNode, FieldPath, FilterSource, UpdateList},
    mutation::{self, Mutation},
    predicate::{self, Predicate},
    schema::{self, ResourceSchema, SchemaViolation},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// CompiledFilter
///
/// A parsed filter tree together with the predicate it compiles to.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledFilter {
    pub tree: ExpressionNode,
    pub predicate: Predicate,
}

///
/// CompiledUpdate
///
/// A parsed update list together with its one atomic mutation.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledUpdate {
    pub leaves: UpdateList,
    pub mutation: Mutation,
}

///
/// Whitelisted
///
/// Parsed input the schema whitelist can check.
///

pub trait Whitelisted {
    fn check(&self, schema: &ResourceSchema) -> Result<(), SchemaViolation>;
}

impl Whitelisted for ExpressionNode {
    fn check(&self, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
        schema::validate_filter(self, schema)
    }
}

impl Whitelisted for UpdateList {
    fn check(&self, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
        schema::validate_update(self, schema)
    }
}

impl Whitelisted for CompiledFilter {
    fn check(&self, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
        self.tree.check(schema)
    }
}

impl Whitelisted for CompiledUpdate {
    fn check(&self, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
        self.leaves.check(schema)
    }
}

/// Parse a filter from either encoding and compile it.
pub fn compile_filter<'a>(source: impl Into<FilterSource<'a>>) -> Result<CompiledFilter, Error> {
    compile_filter_with(source, &DslConfig::default())
}

pub fn compile_filter_with<'a>(
    source: impl Into<FilterSource<'a>>,
    config: &DslConfig,
) -> Result<CompiledFilter, Error> {
    let tree = expr::parse_filter(source.into(), config).map_err(EngineError::from)?;
    let predicate = predicate::compile_filter(&tree).map_err(EngineError::from)?;

    Ok(CompiledFilter { tree, predicate })
}

/// Parse an update list and compile it into one mutation.
pub fn compile_update(source: &str) -> Result<CompiledUpdate, Error> {
    compile_update_with(source, &DslConfig::default())
}

pub fn compile_update_with(source: &str, config: &DslConfig) -> Result<CompiledUpdate, Error> {
    let leaves = expr::parse_update(source, config).map_err(EngineError::from)?;
    let mutation = mutation::compile_update(&leaves, config).map_err(EngineError::from)?;

    Ok(CompiledUpdate { leaves, mutation })
}

pub fn validate_against_schema<T: Whitelisted + ?Sized>(
    parsed: &T,
    schema: &ResourceSchema,
) -> Result<(), Error> {
    parsed
        .check(schema)
        .map_err(|violation| EngineError::from(violation).into())
}

#[must_use]
pub fn build_read_access_predicate(
    schema: &ResourceSchema,
    actor: &ActorRef,
    required: &[FieldPath],
    optional: &[FieldPath],
) -> Predicate {
    AccessPredicateBuilder::for_schema(schema).read(actor, required, optional)
}

pub fn build_update_access_predicate(
    schema: &ResourceSchema,
    actor: &ActorRef,
    fields: &[FieldPath],
) -> Result<Predicate, Error> {
    AccessPredicateBuilder::for_schema(schema)
        .update(actor, fields)
        .map_err(|violation| EngineError::from(violation).into())
}

#[must_use]
pub fn build_delete_access_predicate(schema: &ResourceSchema, actor: &ActorRef) -> Predicate {
    AccessPredicateBuilder::for_schema(schema).delete(actor)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        CompiledFilter, CompiledUpdate, Whitelisted as _, build_delete_access_predicate,
        build_read_access_predicate, build_update_access_predicate, compile_filter,
        compile_update, validate_against_schema,
    };
    pub use fieldgate_core::prelude::*;
}
