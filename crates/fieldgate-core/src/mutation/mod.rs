//! Update mutations: compilation from update lists, backend rendering and a
//! reference executor.

mod apply;
mod ast;
mod compile;
mod render;

#[cfg(test)]
mod tests;

// re-exports
pub use apply::{ApplyError, apply};
pub use ast::{FieldMutation, Mutation, MutationOp};
pub use compile::compile_update;
pub use render::render;
