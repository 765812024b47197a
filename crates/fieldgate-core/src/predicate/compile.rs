use crate::{
    expr::{BoolOp, ExpressionNode, FieldPath, FilterOp, Leaf, OperationVocabulary},
    obs::{
        DslKind, RejectStage,
        sink::{MetricsEvent, record},
    },
    predicate::{CompareOp, Predicate},
    value::Value,
};
use regex::Regex;
use thiserror::Error as ThisError;

///
/// CompileError
///
/// A parsed leaf whose operand does not fit its operation.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("operation {operation} on '{field}' expects {expected}")]
    InvalidOperand {
        field: String,
        operation: &'static str,
        expected: &'static str,
    },

    #[error("invalid regex for '{field}': {message}")]
    InvalidRegex { field: String, message: String },

    #[error("update operations on '{first}' and '{second}' conflict")]
    ConflictingPaths { first: String, second: String },

    #[error("invalid pull filter for '{field}': {message}")]
    PullFilter { field: String, message: String },
}

impl CompileError {
    pub(crate) fn operand<O: OperationVocabulary>(leaf: &Leaf<O>, expected: &'static str) -> Self {
        Self::InvalidOperand {
            field: leaf.field.to_string(),
            operation: leaf.operation.label(),
            expected,
        }
    }
}

/// Compile a filter tree into a predicate.
///
/// Every operation maps to exactly one primitive; composites map to AND/OR
/// of their compiled children.
pub fn compile_filter(node: &ExpressionNode) -> Result<Predicate, CompileError> {
    let result = compile_node(node);
    if result.is_err() {
        record(MetricsEvent::ExpressionRejected {
            dsl: DslKind::Filter,
            stage: RejectStage::Compile,
        });
    }

    result
}

fn compile_node(node: &ExpressionNode) -> Result<Predicate, CompileError> {
    match node {
        ExpressionNode::Leaf(leaf) => compile_leaf(leaf),
        ExpressionNode::Composite {
            operator,
            left,
            right,
        } => {
            let children = vec![compile_node(left)?, compile_node(right)?];
            Ok(match operator {
                BoolOp::And => Predicate::And(children),
                BoolOp::Or => Predicate::Or(children),
            })
        }
    }
}

fn compile_leaf(leaf: &Leaf<FilterOp>) -> Result<Predicate, CompileError> {
    let field = leaf.field.clone();

    let predicate = match leaf.operation {
        FilterOp::Eq => Predicate::compare(field, CompareOp::Eq, leaf.value.clone()),
        FilterOp::Ne => Predicate::compare(field, CompareOp::Ne, leaf.value.clone()),
        FilterOp::Gt => ordered(leaf, field, CompareOp::Gt)?,
        FilterOp::Lt => ordered(leaf, field, CompareOp::Lt)?,
        FilterOp::Gte => ordered(leaf, field, CompareOp::Gte)?,
        FilterOp::Lte => ordered(leaf, field, CompareOp::Lte)?,

        FilterOp::In => Predicate::In {
            field,
            values: list(leaf)?,
        },
        FilterOp::All => Predicate::All {
            field,
            values: list(leaf)?,
        },

        FilterOp::Regex => {
            let Value::Text(pattern) = &leaf.value else {
                return Err(CompileError::operand(leaf, "a string pattern"));
            };
            Regex::new(pattern).map_err(|e| CompileError::InvalidRegex {
                field: leaf.field.to_string(),
                message: e.to_string(),
            })?;

            Predicate::Regex {
                field,
                pattern: pattern.clone(),
            }
        }

        FilterOp::Exists => {
            let exists = leaf
                .value
                .as_bool()
                .ok_or_else(|| CompileError::operand(leaf, "a bool"))?;

            Predicate::Exists { field, exists }
        }

        FilterOp::AnyEq => any_element(leaf, field, CompareOp::Eq)?,
        FilterOp::AnyNe => any_element(leaf, field, CompareOp::Ne)?,
        FilterOp::AnyGt => any_element(leaf, field, CompareOp::Gt)?,
        FilterOp::AnyLt => any_element(leaf, field, CompareOp::Lt)?,
        FilterOp::AnyGte => any_element(leaf, field, CompareOp::Gte)?,
        FilterOp::AnyLte => any_element(leaf, field, CompareOp::Lte)?,

        FilterOp::SizeEq => size(leaf, field, CompareOp::Eq)?,
        FilterOp::SizeGt => size(leaf, field, CompareOp::Gt)?,
        FilterOp::SizeLt => size(leaf, field, CompareOp::Lt)?,
        FilterOp::SizeGte => size(leaf, field, CompareOp::Gte)?,
        FilterOp::SizeLte => size(leaf, field, CompareOp::Lte)?,
    };

    Ok(predicate)
}

fn ordered(
    leaf: &Leaf<FilterOp>,
    field: FieldPath,
    op: CompareOp,
) -> Result<Predicate, CompileError> {
    if !orderable(&leaf.value) {
        return Err(CompileError::operand(leaf, "an orderable scalar"));
    }

    Ok(Predicate::compare(field, op, leaf.value.clone()))
}

fn any_element(
    leaf: &Leaf<FilterOp>,
    field: FieldPath,
    op: CompareOp,
) -> Result<Predicate, CompileError> {
    let valid = match op {
        CompareOp::Eq | CompareOp::Ne => leaf.value.is_scalar(),
        _ => orderable(&leaf.value),
    };
    if !valid {
        return Err(CompileError::operand(leaf, "a scalar element value"));
    }

    Ok(Predicate::AnyElement {
        field,
        op,
        value: leaf.value.clone(),
    })
}

fn size(leaf: &Leaf<FilterOp>, field: FieldPath, op: CompareOp) -> Result<Predicate, CompileError> {
    let len = leaf
        .value
        .as_len()
        .ok_or_else(|| CompileError::operand(leaf, "a non-negative integer"))?;

    Ok(Predicate::size(field, op, len))
}

fn list(leaf: &Leaf<FilterOp>) -> Result<Vec<Value>, CompileError> {
    leaf.value
        .as_list()
        .map(<[Value]>::to_vec)
        .ok_or_else(|| CompileError::operand(leaf, "an array type"))
}

const fn orderable(value: &Value) -> bool {
    value.is_numeric()
        || matches!(
            value,
            Value::Text(_) | Value::DateTime(_) | Value::Bool(_) | Value::ObjectId(_)
        )
}
