//! Compiled predicates: the AST, the filter compiler, normalization,
//! backend rendering and reference evaluation.

mod ast;
mod compile;
mod eval;
mod normalize;
mod render;


// re-exports
pub use ast::{CompareOp, ComparePredicate, Predicate};
pub use compile::{CompileError, compile_filter};
pub use eval::{FieldPresence, Row, eval};
pub use normalize::normalize;
pub use render::render;
