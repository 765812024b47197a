use crate::{
    predicate::{ComparePredicate, CompareOp, Predicate},
    value::{Document, Value, compare_eq, compare_order},
};
use regex::Regex;
use std::cmp::Ordering;

///
/// FieldPresence
///
/// Result of reading a field from a row during evaluation. Distinguishes a
/// missing field from a present one holding `Value::Null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPresence<'a> {
    Present(&'a Value),
    Missing,
}

///
/// Row
///
/// Anything that can expose values by dotted path.
///

pub trait Row {
    fn field(&self, path: &str) -> FieldPresence<'_>;
}

impl Row for Document {
    fn field(&self, path: &str) -> FieldPresence<'_> {
        let (head, rest) = path.split_once('.').map_or((path, None), |(h, r)| (h, Some(r)));
        let found = match (self.get(head), rest) {
            (Some(value), Some(rest)) => value.lookup(rest),
            (found, None) => found,
            (None, Some(_)) => None,
        };

        found.map_or(FieldPresence::Missing, FieldPresence::Present)
    }
}

// Evaluate a field predicate only when the field is present.
fn on_present<R: Row + ?Sized>(row: &R, field: &str, f: impl FnOnce(&Value) -> bool) -> bool {
    match row.field(field) {
        FieldPresence::Present(value) => f(value),
        FieldPresence::Missing => false,
    }
}

///
/// Evaluate a predicate against a single row.
///
/// Pure reference evaluation for tests and in-memory executors, selecting
/// the same documents as the rendered filter:
///
/// - a missing field compares equal to `null` and unequal to anything else;
/// - `Eq`, `Ne`, ordering and `In` against an array field also consider its
///   elements;
/// - comparisons with no defined result evaluate to `false`.
///
#[must_use]
pub fn eval<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,

        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::In { field, values } => match row.field(field.as_str()) {
            FieldPresence::Present(actual) => values.iter().any(|x| equals_field(actual, x)),
            FieldPresence::Missing => values.iter().any(|x| matches!(x, Value::Null)),
        },

        // An empty `All` matches nothing; a scalar field holds one element.
        Predicate::All { field, values } => on_present(row, field.as_str(), |actual| {
            !values.is_empty() && values.iter().all(|x| equals_field(actual, x))
        }),

        Predicate::Regex { field, pattern } => {
            // NOTE: patterns are validated at compile time; a bad one simply never matches.
            let Ok(re) = Regex::new(pattern) else {
                return false;
            };
            on_present(row, field.as_str(), |actual| match actual {
                Value::Text(s) => re.is_match(s),
                Value::List(items) => items
                    .iter()
                    .any(|item| item.as_text().is_some_and(|s| re.is_match(s))),
                _ => false,
            })
        }

        Predicate::Exists { field, exists } => {
            matches!(row.field(field.as_str()), FieldPresence::Present(_)) == *exists
        }

        Predicate::AnyElement { field, op, value } => on_present(row, field.as_str(), |actual| {
            actual
                .as_list()
                .is_some_and(|items| items.iter().any(|item| compare(item, *op, value)))
        }),

        Predicate::Size { field, op, len } => on_present(row, field.as_str(), |actual| {
            actual.as_list().is_some_and(|items| {
                let actual_len = items.len() as u64;
                ordering_matches(actual_len.cmp(len), *op)
            })
        }),

        Predicate::ElemMatch { field, predicate } => on_present(row, field.as_str(), |actual| {
            actual.as_list().is_some_and(|items| {
                items
                    .iter()
                    .filter_map(Value::as_document)
                    .any(|element| eval(element, predicate))
            })
        }),
    }
}

fn eval_compare<R: Row + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    match row.field(cmp.field.as_str()) {
        FieldPresence::Present(actual) => match cmp.op {
            CompareOp::Eq => equals_field(actual, &cmp.value),
            CompareOp::Ne => !equals_field(actual, &cmp.value),
            op => {
                compare(actual, op, &cmp.value)
                    || actual
                        .as_list()
                        .is_some_and(|items| items.iter().any(|item| compare(item, op, &cmp.value)))
            }
        },
        FieldPresence::Missing => {
            let null = matches!(cmp.value, Value::Null);
            match cmp.op {
                CompareOp::Eq => null,
                CompareOp::Ne => !null,
                _ => false,
            }
        }
    }
}

// Equality against a field value, or against any element when it is an array.
fn equals_field(actual: &Value, expected: &Value) -> bool {
    compare_eq(actual, expected)
        || actual
            .as_list()
            .is_some_and(|items| items.iter().any(|item| compare_eq(item, expected)))
}

fn compare(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    match op {
        CompareOp::Eq => compare_eq(actual, expected),
        CompareOp::Ne => !compare_eq(actual, expected),
        _ => compare_order(actual, expected).is_some_and(|ord| ordering_matches(ord, op)),
    }
}

const fn ordering_matches(ord: Ordering, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => ord.is_eq(),
        CompareOp::Ne => ord.is_ne(),
        CompareOp::Gt => ord.is_gt(),
        CompareOp::Lt => ord.is_lt(),
        CompareOp::Gte => ord.is_ge(),
        CompareOp::Lte => ord.is_le(),
    }
}
