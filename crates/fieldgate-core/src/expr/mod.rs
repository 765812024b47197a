//! Expression trees for the filter and update DSLs, with their string and
//! JSON codecs.

mod field;
mod leaf;
mod lexer;
mod node;
mod ops;
mod parser;
mod tree;
mod update;

#[cfg(test)]
mod tests;

use crate::{
    config::DslConfig,
    obs::{
        DslKind, RejectStage,
        sink::{MetricsEvent, record},
    },
    value::CoercionError,
};
use thiserror::Error as ThisError;

// re-exports
pub use field::FieldPath;
pub use leaf::Leaf;
pub use node::{BoolOp, ExpressionNode};
pub use ops::{FilterOp, OperationVocabulary, UpdateOp};
pub use update::UpdateList;

pub(crate) use tree::parse_filter_json_str as decode_filter_json;

///
/// FilterSource
///
/// The two encodings a filter may arrive in.
///

#[derive(Clone, Copy, Debug)]
pub enum FilterSource<'a> {
    Grammar(&'a str),
    Tree(&'a serde_json::Value),
}

impl<'a> From<&'a str> for FilterSource<'a> {
    fn from(source: &'a str) -> Self {
        Self::Grammar(source)
    }
}

impl<'a> From<&'a serde_json::Value> for FilterSource<'a> {
    fn from(tree: &'a serde_json::Value) -> Self {
        Self::Tree(tree)
    }
}

/// Parse a filter from either encoding.
pub fn parse_filter(
    source: FilterSource<'_>,
    config: &DslConfig,
) -> Result<ExpressionNode, ExprError> {
    let result = match source {
        FilterSource::Grammar(text) => parser::parse_grammar(text, config),
        FilterSource::Tree(json) => tree::parse_filter_json(json, config),
    };

    observe(DslKind::Filter, result.as_ref().map(ExpressionNode::leaf_count));
    result
}

/// Parse a filter from its JSON text.
pub fn parse_filter_json_str(
    source: &str,
    config: &DslConfig,
) -> Result<ExpressionNode, ExprError> {
    let result = tree::parse_filter_json_str(source, config);

    observe(DslKind::Filter, result.as_ref().map(ExpressionNode::leaf_count));
    result
}

/// Parse an update list from the string grammar.
pub fn parse_update(source: &str, config: &DslConfig) -> Result<UpdateList, ExprError> {
    let result = update::parse_update_source(source, config);

    observe(DslKind::Update, result.as_ref().map(UpdateList::len));
    result
}

/// Parse an update list from a JSON array of leaves.
pub fn parse_update_json(json: &serde_json::Value) -> Result<UpdateList, ExprError> {
    let result = tree::parse_update_leaves(json).and_then(UpdateList::new);

    observe(DslKind::Update, result.as_ref().map(UpdateList::len));
    result
}

fn observe<T>(dsl: DslKind, outcome: Result<usize, &T>) {
    let event = match outcome {
        Ok(leaves) => MetricsEvent::ExpressionParsed {
            dsl,
            leaves: u64::try_from(leaves).unwrap_or(u64::MAX),
        },
        Err(_) => MetricsEvent::ExpressionRejected {
            dsl,
            stage: RejectStage::Parse,
        },
    };

    record(event);
}

///
/// ExprError
///
/// Malformed-expression failures. String-grammar variants carry the byte
/// offset of the offending token and, for clauses, the clause text.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("expression is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("unbalanced parentheses: {open} '(' and {close} ')'")]
    UnbalancedParentheses { open: usize, close: usize },

    #[error("unexpected ')' at byte {offset}")]
    UnexpectedClose { offset: usize },

    #[error("group opened at byte {offset} is never closed")]
    UnclosedGroup { offset: usize },

    #[error("empty group at byte {offset}")]
    EmptyGroup { offset: usize },

    #[error("empty clause at byte {offset}")]
    EmptyClause { offset: usize },

    #[error("groups nested deeper than {max} at byte {offset}")]
    TooDeep { offset: usize, max: usize },

    #[error("missing '&&' or '||' before byte {offset}")]
    MissingOperator { offset: usize },

    #[error("operator at byte {offset} has no right operand")]
    DanglingOperator { offset: usize },

    #[error("{groups} bare groups in one level at byte {offset}, at most two are allowed")]
    TooManyGroups { offset: usize, groups: usize },

    #[error("'&&' and '||' mixed at byte {offset} in a level that contains a group")]
    MixedOperators { offset: usize },

    #[error(
        "clause '{clause}' at byte {offset} has {parts} parts, expected field::operation::value::type"
    )]
    LeafArity {
        offset: usize,
        clause: String,
        parts: usize,
    },

    #[error("clause '{clause}' at byte {offset}: {message}")]
    InvalidField {
        offset: usize,
        clause: String,
        message: String,
    },

    #[error("clause '{clause}' at byte {offset}: unknown operation '{operation}'")]
    UnknownOperation {
        offset: usize,
        clause: String,
        operation: String,
    },

    #[error("clause '{clause}' at byte {offset}: {source}")]
    Coercion {
        offset: usize,
        clause: String,
        source: CoercionError,
    },

    #[error("value '{literal}' of '{field}' cannot be written in the string grammar")]
    Unencodable { field: String, literal: String },

    #[error("group operation '{operation}' must be '&&' or '||'")]
    GroupOperation { operation: String },

    #[error("invalid JSON expression: {message}")]
    Json { message: String },
}
