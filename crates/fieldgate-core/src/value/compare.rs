use crate::value::Value;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::cmp::Ordering;

///
/// Value comparison
///
/// Comparison helpers shared by predicate evaluation and mutation apply.
/// Numeric variants compare across widths through `Decimal`; every other
/// variant only compares against itself.
///

/// Structural equality with numeric widening.
///
/// Lists compare element-wise and documents key-by-key, both recursively.
#[must_use]
pub fn compare_eq(actual: &Value, expected: &Value) -> bool {
    if actual.is_numeric() && expected.is_numeric() {
        return numeric_order(actual, expected) == Some(Ordering::Equal);
    }

    match (actual, expected) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| compare_eq(x, y))
        }
        (Value::Document(a), Value::Document(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && compare_eq(va, vb))
        }
        _ => actual == expected,
    }
}

/// Ordering between two scalars of a comparable kind.
///
/// Returns `None` when the pair has no defined order (mixed kinds, nulls,
/// lists or documents).
#[must_use]
pub fn compare_order(actual: &Value, expected: &Value) -> Option<Ordering> {
    if actual.is_numeric() && expected.is_numeric() {
        return numeric_order(actual, expected);
    }

    match (actual, expected) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::ObjectId(a), Value::ObjectId(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn numeric_order(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (to_decimal(a), to_decimal(b)) {
        return Some(x.cmp(&y));
    }

    // out of Decimal range; fall back to doubles
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Int(n) => Some(Decimal::from(*n)),
        Value::Long(n) => Some(Decimal::from(*n)),
        Value::Double(f) => Decimal::from_f64(f.get()),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}
