//! Field-level, multi-actor permission model and the access predicates built
//! from it.

mod access;
mod grant;
mod model;


// re-exports
pub use access::{AccessPredicateBuilder, ProtectedFieldViolation};
pub use model::{
    ActorRef, AllReaders, AllUpdaters, AuthorType, Deleter, Field, Reader, Updater, UserPermissions,
};
