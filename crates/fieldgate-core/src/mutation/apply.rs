use crate::{
    expr::FieldPath,
    mutation::{FieldMutation, Mutation, MutationOp},
    predicate::eval,
    types::Float64,
    value::{Document, Value, compare_eq, compare_order},
};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

///
/// ApplyError
///
/// Reference-executor failures. The document is left untouched when any
/// operation fails.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ApplyError {
    #[error("{operation} cannot apply to '{field}' holding a {found}")]
    TypeMismatch {
        field: String,
        operation: &'static str,
        found: &'static str,
    },

    #[error("path '{field}' runs through a non-document value")]
    NotTraversable { field: String },

    #[error("numeric overflow on '{field}'")]
    Overflow { field: String },
}

/// Apply a mutation to a document, all or nothing.
///
/// Every operation runs against a working copy, which replaces the document
/// only when all of them succeed.
pub fn apply(mutation: &Mutation, doc: &mut Document) -> Result<(), ApplyError> {
    let mut working = doc.clone();
    for m in &mutation.ops {
        apply_one(m, &mut working)?;
    }
    *doc = working;

    Ok(())
}

fn apply_one(m: &FieldMutation, doc: &mut Document) -> Result<(), ApplyError> {
    let field = &m.field;

    match &m.op {
        MutationOp::Set(value) => set_path(doc, field, value.clone()),
        MutationOp::Unset => {
            remove_path(doc, field);
            Ok(())
        }
        MutationOp::Rename(target) => {
            if let Some(value) = remove_path(doc, field) {
                set_path(doc, target, value)?;
            }
            Ok(())
        }

        MutationOp::Inc(delta) => {
            let next = match get_path(doc, field) {
                None => from_double(*delta),
                Some(current) => arith(field, "Inc", current, *delta, Arith::Add)?,
            };
            set_path(doc, field, next)
        }
        MutationOp::Mul(factor) => {
            let next = match get_path(doc, field) {
                None => Value::Int(0),
                Some(current) => arith(field, "Mul", current, *factor, Arith::Mul)?,
            };
            set_path(doc, field, next)
        }
        MutationOp::Max(bound) => extreme(doc, field, "Max", *bound, Ordering::Greater),
        MutationOp::Min(bound) => extreme(doc, field, "Min", *bound, Ordering::Less),

        MutationOp::PopFirst => edit_list(doc, field, "PopFirst", |items| {
            if !items.is_empty() {
                items.remove(0);
            }
        }),
        MutationOp::PopLast => edit_list(doc, field, "PopLast", |items| {
            items.pop();
        }),
        MutationOp::Pull(value) => edit_list(doc, field, "Pull", |items| {
            items.retain(|item| !compare_eq(item, value));
        }),
        MutationOp::PullAll(values) => edit_list(doc, field, "PullAll", |items| {
            items.retain(|item| !values.iter().any(|v| compare_eq(item, v)));
        }),
        MutationOp::PullFilter(pred) => edit_list(doc, field, "PullFilter", |items| {
            items.retain(|item| !item.as_document().is_some_and(|d| eval(d, pred)));
        }),
        MutationOp::Push(value) => push(doc, field, "Push", std::slice::from_ref(value)),
        MutationOp::PushEach(values) => push(doc, field, "PushEach", values),
    }
}

///
/// ARITHMETIC
///

#[derive(Clone, Copy)]
enum Arith {
    Add,
    Mul,
}

// Integer fields stay integral while the operand is integral; Int widens to
// Long on overflow.
#[expect(clippy::cast_possible_truncation)]
fn arith(
    field: &FieldPath,
    operation: &'static str,
    current: &Value,
    operand: Float64,
    kind: Arith,
) -> Result<Value, ApplyError> {
    let rhs = operand.get();
    let integral = operand.is_integral() && rhs.abs() < 9_007_199_254_740_992.0;
    let overflow = || ApplyError::Overflow {
        field: field.to_string(),
    };

    let next = match current {
        Value::Int(n) if integral => {
            let wide = int_op(i64::from(*n), rhs as i64, kind).ok_or_else(overflow)?;
            i32::try_from(wide).map_or(Value::Long(wide), Value::Int)
        }
        Value::Long(n) if integral => Value::Long(int_op(*n, rhs as i64, kind).ok_or_else(overflow)?),
        Value::Decimal(d) => {
            let rhs = Decimal::from_f64(rhs).ok_or_else(overflow)?;
            let out = match kind {
                Arith::Add => d.checked_add(rhs),
                Arith::Mul => d.checked_mul(rhs),
            };
            Value::Decimal(out.ok_or_else(overflow)?)
        }
        Value::Int(_) | Value::Long(_) | Value::Double(_) => {
            let lhs = current.as_f64().ok_or_else(overflow)?;
            let out = match kind {
                Arith::Add => lhs + rhs,
                Arith::Mul => lhs * rhs,
            };
            Value::Double(Float64::try_new(out).ok_or_else(overflow)?)
        }
        other => {
            return Err(ApplyError::TypeMismatch {
                field: field.to_string(),
                operation,
                found: other.kind(),
            });
        }
    };

    Ok(next)
}

const fn int_op(lhs: i64, rhs: i64, kind: Arith) -> Option<i64> {
    match kind {
        Arith::Add => lhs.checked_add(rhs),
        Arith::Mul => lhs.checked_mul(rhs),
    }
}

#[expect(clippy::cast_possible_truncation)]
fn from_double(n: Float64) -> Value {
    let v = n.get();
    if n.is_integral() && v.abs() < 9_007_199_254_740_992.0 {
        let wide = v as i64;
        i32::try_from(wide).map_or(Value::Long(wide), Value::Int)
    } else {
        Value::Double(n)
    }
}

// The bound replaces the current value when it orders as `replace_when`
// against it; a missing field takes the bound.
fn extreme(
    doc: &mut Document,
    field: &FieldPath,
    operation: &'static str,
    bound: Float64,
    replace_when: Ordering,
) -> Result<(), ApplyError> {
    let candidate = from_double(bound);
    let replace = match get_path(doc, field) {
        None => true,
        Some(current) if current.is_numeric() => {
            compare_order(&candidate, current) == Some(replace_when)
        }
        Some(other) => {
            return Err(ApplyError::TypeMismatch {
                field: field.to_string(),
                operation,
                found: other.kind(),
            });
        }
    };

    if replace {
        set_path(doc, field, candidate)?;
    }

    Ok(())
}

///
/// ARRAYS
///

fn edit_list(
    doc: &mut Document,
    field: &FieldPath,
    operation: &'static str,
    f: impl FnOnce(&mut Vec<Value>),
) -> Result<(), ApplyError> {
    match get_path_mut(doc, field) {
        None => Ok(()),
        Some(Value::List(items)) => {
            f(items);
            Ok(())
        }
        Some(other) => Err(ApplyError::TypeMismatch {
            field: field.to_string(),
            operation,
            found: other.kind(),
        }),
    }
}

fn push(
    doc: &mut Document,
    field: &FieldPath,
    operation: &'static str,
    values: &[Value],
) -> Result<(), ApplyError> {
    match get_path_mut(doc, field) {
        None => set_path(doc, field, Value::List(values.to_vec())),
        Some(Value::List(items)) => {
            items.extend_from_slice(values);
            Ok(())
        }
        Some(other) => Err(ApplyError::TypeMismatch {
            field: field.to_string(),
            operation,
            found: other.kind(),
        }),
    }
}

///
/// PATHS
///

fn get_path<'a>(doc: &'a Document, field: &FieldPath) -> Option<&'a Value> {
    let mut segments = field.segments();
    let head = doc.get(segments.next()?)?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        Some(head)
    } else {
        head.lookup(&rest.join("."))
    }
}

fn get_path_mut<'a>(doc: &'a mut Document, field: &FieldPath) -> Option<&'a mut Value> {
    let mut segments = field.segments();
    let mut current = doc.get_mut(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Document(inner) => inner.get_mut(segment)?,
            Value::List(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

// Intermediate documents are created as needed.
fn set_path(doc: &mut Document, field: &FieldPath, value: Value) -> Result<(), ApplyError> {
    let segments: Vec<&str> = field.segments().collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = doc;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        current = match slot {
            Value::Document(inner) => inner,
            _ => {
                return Err(ApplyError::NotTraversable {
                    field: field.to_string(),
                });
            }
        };
    }
    current.insert((*last).to_string(), value);

    Ok(())
}

fn remove_path(doc: &mut Document, field: &FieldPath) -> Option<Value> {
    let segments: Vec<&str> = field.segments().collect();
    let (last, parents) = segments.split_last()?;

    let mut current = doc;
    for segment in parents {
        current = match current.get_mut(*segment)? {
            Value::Document(inner) => inner,
            _ => return None,
        };
    }

    current.remove(*last)
}
