use crate::{expr::FieldPath, value::Value};
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// Backend-neutral form of a compiled filter or access fragment. Field paths
/// are already canonical; values are already typed. Rendering, evaluation and
/// normalization are separate passes over this tree.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    /// Backend operator key.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Lt => "$lt",
            Self::Gte => "$gte",
            Self::Lte => "$lte",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub field: FieldPath,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub const fn new(field: FieldPath, op: CompareOp, value: Value) -> Self {
        Self { field, op, value }
    }
}

///
/// Predicate
///
/// AnyElement → some element of an array field satisfies the comparison.
/// Size       → array cardinality compared against `len`.
/// ElemMatch  → some document element satisfies `predicate`, whose paths
///              are relative to the element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    In {
        field: FieldPath,
        values: Vec<Value>,
    },
    All {
        field: FieldPath,
        values: Vec<Value>,
    },
    Regex {
        field: FieldPath,
        pattern: String,
    },
    Exists {
        field: FieldPath,
        exists: bool,
    },
    AnyElement {
        field: FieldPath,
        op: CompareOp,
        value: Value,
    },
    Size {
        field: FieldPath,
        op: CompareOp,
        len: u64,
    },
    ElemMatch {
        field: FieldPath,
        predicate: Box<Self>,
    },
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn eq(field: FieldPath, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Eq, value.into()))
    }

    #[must_use]
    pub fn compare(field: FieldPath, op: CompareOp, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(field, op, value))
    }

    #[must_use]
    pub fn elem_match(field: FieldPath, predicate: Self) -> Self {
        Self::ElemMatch {
            field,
            predicate: Box::new(predicate),
        }
    }

    #[must_use]
    pub const fn size(field: FieldPath, op: CompareOp, len: u64) -> Self {
        Self::Size { field, op, len }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
