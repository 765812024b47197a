use crate::predicate::{Predicate, render};

///
/// Normalize a predicate into a canonical, deterministic form.
///
/// Normalization guarantees:
/// - Logical equivalence is preserved
/// - Nested AND / OR nodes are flattened
/// - Neutral elements are removed (True / False)
/// - Double negation is eliminated
/// - Child predicates are deterministically ordered
///
/// Two filters that differ only in operand order normalize to the same tree.
///
#[must_use]
pub fn normalize(predicate: &Predicate) -> Predicate {
    match predicate {
        Predicate::And(children) => normalize_and(children),
        Predicate::Or(children) => normalize_or(children),
        Predicate::Not(inner) => normalize_not(inner),
        Predicate::ElemMatch { field, predicate } => Predicate::ElemMatch {
            field: field.clone(),
            predicate: Box::new(normalize(predicate)),
        },
        other => other.clone(),
    }
}

///
/// Normalize a NOT expression.
///
/// Eliminates double negation:
///     NOT (NOT x)  →  x
///
fn normalize_not(inner: &Predicate) -> Predicate {
    match normalize(inner) {
        Predicate::Not(double) => *double,
        Predicate::True => Predicate::False,
        Predicate::False => Predicate::True,
        other => Predicate::Not(Box::new(other)),
    }
}

///
/// Normalize an AND expression.
///
/// Rules:
/// - AND(True, x)        → x
/// - AND(False, x)       → False
/// - AND(AND(a, b), c)   → AND(a, b, c)
/// - AND(x)              → x
/// - AND()               → True
///
fn normalize_and(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::True => {}
            Predicate::False => return Predicate::False,
            Predicate::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    finish(out, Predicate::True, Predicate::And)
}

///
/// Normalize an OR expression.
///
/// Rules:
/// - OR(False, x)       → x
/// - OR(True, x)        → True
/// - OR(OR(a, b), c)    → OR(a, b, c)
/// - OR(x)              → x
/// - OR()               → False
///
fn normalize_or(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::False => {}
            Predicate::True => return Predicate::True,
            Predicate::Or(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    finish(out, Predicate::False, Predicate::Or)
}

fn finish(
    mut out: Vec<Predicate>,
    empty: Predicate,
    wrap: fn(Vec<Predicate>) -> Predicate,
) -> Predicate {
    out.sort_by_cached_key(sort_key);
    out.dedup();

    match out.len() {
        0 => empty,
        1 => out.pop().unwrap_or(empty),
        _ => wrap(out),
    }
}

// Rendered documents are canonical (object keys are sorted), so their text
// is a total, deterministic sort key.
fn sort_key(predicate: &Predicate) -> String {
    render(predicate).to_string()
}

///
/// TESTS
///
