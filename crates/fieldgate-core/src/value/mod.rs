mod coercion;
mod compare;
mod json;

#[cfg(test)]
mod tests;

use crate::types::{Float64, ObjectId};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::collections::BTreeMap;

// re-exports
pub use coercion::{CoercionError, ScalarTag, TypeTag, coerce};
pub use compare::{compare_eq, compare_order};

///
/// Document
///
/// Field map for one stored resource or one embedded sub-document.
///

pub type Document = BTreeMap<String, Value>;

///
/// Value
///
/// Tagged union for every literal the DSLs can carry plus the nested shapes
/// a stored document needs. Runtime type tokens disappear once a literal has
/// been coerced into one of these variants.
///
/// Null      → explicit null literal (`null` type tag).
/// Document  → embedded sub-document; never produced by coercion.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    DateTime(DateTime<Utc>),
    Decimal(Decimal),
    Document(Document),
    Double(Float64),
    Int(i32),
    List(Vec<Self>),
    Long(i64),
    Null,
    ObjectId(ObjectId),
    Text(String),
}

impl Value {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        if let Self::Document(doc) = self {
            Some(doc)
        } else {
            None
        }
    }

    /// Variant name, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Document(_) => "document",
            Self::Double(_) => "double",
            Self::Int(_) => "int",
            Self::List(_) => "array",
            Self::Long(_) => "long",
            Self::Null => "null",
            Self::ObjectId(_) => "objectId",
            Self::Text(_) => "string",
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Long(_) | Self::Double(_) | Self::Decimal(_)
        )
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Document(_))
    }

    /// Non-negative integral value, used by cardinality operators.
    #[must_use]
    pub fn as_len(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::Long(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Numeric operand as a double, used by arithmetic update operators.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(f64::from(*n)),
            Self::Long(n) => Some(*n as f64),
            Self::Double(f) => Some(f.get()),
            Self::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Resolve a dotted path inside nested documents. Numeric segments index
    /// into lists.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        path.split('.').try_fold(self, |current, segment| match current {
            Self::Document(doc) => doc.get(segment),
            Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    ///
    /// LITERALS
    ///

    /// Re-encode a value into the DSL literal that coerces back into it.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Decimal(d) => d.to_string(),
            Self::Double(f) => f.get().to_string(),
            Self::Int(n) => n.to_string(),
            Self::Long(n) => n.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_literal)
                .collect::<Vec<_>>()
                .join(","),
            Self::Null => "null".to_string(),
            Self::ObjectId(id) => id.to_hex(),
            Self::Text(s) => s.clone(),
            Self::Document(_) => String::new(),
        }
    }
}

///
/// FieldValue
///
/// Conversion from a domain type into its stored document shape.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for ObjectId {
    fn to_value(&self) -> Value {
        Value::ObjectId(*self)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::ObjectId(id)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}
