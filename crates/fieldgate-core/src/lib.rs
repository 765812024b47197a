//! Engine for field-level access control over a document store: the filter
//! and update DSLs, their compilers, the schema whitelist, the permission
//! model and the access predicates built from it.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod acl;
pub mod config;
pub mod error;
pub mod expr;
pub mod mutation;
pub mod obs;
pub mod plan;
pub mod predicate;
pub mod schema;
pub mod session;
pub mod types;
pub mod value;

///
/// Prelude
///
/// Domain vocabulary only. No errors, codecs or builders are re-exported
/// here.
///

pub mod prelude {
    pub use crate::{
        acl::{ActorRef, AuthorType, Field, UserPermissions},
        expr::{ExpressionNode, FieldPath, UpdateList},
        mutation::Mutation,
        predicate::Predicate,
        schema::ResourceSchema,
        types::{Float64, ObjectId},
        value::{Document, Value},
    };
}
