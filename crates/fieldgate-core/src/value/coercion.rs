use crate::{
    types::{Float64, ObjectId},
    value::Value,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// Literal coercion
///
/// Turns a raw DSL literal plus its declared type tag into a typed `Value`.
/// The tag vocabulary is closed: an unknown tag is an error, never a silent
/// fallback to text.
///

///
/// ScalarTag
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarTag {
    Null,
    String,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Bool,
    DateTime,
    ObjectId,
}

impl ScalarTag {
    pub const ALL: [Self; 10] = [
        Self::Null,
        Self::String,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Bool,
        Self::DateTime,
        Self::ObjectId,
    ];

    /// Wire spelling of the tag.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::ObjectId => "objectId",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Long | Self::Float | Self::Double | Self::Decimal
        )
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.label() == label)
    }
}

///
/// TypeTag
///
/// A scalar tag, optionally in its `_array` form.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeTag {
    pub scalar: ScalarTag,
    pub array: bool,
}

impl TypeTag {
    const ARRAY_SUFFIX: &'static str = "_array";

    #[must_use]
    pub const fn scalar(scalar: ScalarTag) -> Self {
        Self {
            scalar,
            array: false,
        }
    }

    #[must_use]
    pub const fn array(scalar: ScalarTag) -> Self {
        Self {
            scalar,
            array: true,
        }
    }

    /// Every tag in the closed vocabulary, scalars first.
    pub fn all() -> impl Iterator<Item = Self> {
        ScalarTag::ALL
            .into_iter()
            .map(Self::scalar)
            .chain(ScalarTag::ALL.into_iter().map(Self::array))
    }

    /// Whether `raw` names a tag in the closed vocabulary.
    #[must_use]
    pub fn is_known(raw: &str) -> bool {
        raw.parse::<Self>().is_ok()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scalar.label())?;
        if self.array {
            f.write_str(Self::ARRAY_SUFFIX)?;
        }

        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CoercionError::UnknownType { tag: s.to_string() };

        match s.strip_suffix(Self::ARRAY_SUFFIX) {
            Some(base) => ScalarTag::from_label(base)
                .map(Self::array)
                .ok_or_else(unknown),
            None => ScalarTag::from_label(s)
                .map(Self::scalar)
                .ok_or_else(unknown),
        }
    }
}

///
/// CoercionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CoercionError {
    #[error("unknown type tag '{tag}'")]
    UnknownType { tag: String },

    #[error("literal '{literal}' is not a valid {tag}: {message}")]
    InvalidLiteral {
        tag: TypeTag,
        literal: String,
        message: String,
    },
}

/// Coerce a raw literal into a typed value.
///
/// Array tags split on `,` and coerce every element independently; an empty
/// literal is the empty array.
pub fn coerce(raw: &str, tag: TypeTag) -> Result<Value, CoercionError> {
    if !tag.array {
        return coerce_scalar(raw, tag.scalar).map_err(|message| CoercionError::InvalidLiteral {
            tag,
            literal: raw.to_string(),
            message,
        });
    }

    if raw.is_empty() {
        return Ok(Value::List(Vec::new()));
    }

    raw.split(',')
        .map(|item| {
            coerce_scalar(item, tag.scalar).map_err(|message| CoercionError::InvalidLiteral {
                tag,
                literal: item.to_string(),
                message,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn coerce_scalar(raw: &str, tag: ScalarTag) -> Result<Value, String> {
    match tag {
        ScalarTag::Null => {
            if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
                Ok(Value::Null)
            } else {
                Err("null literals must be empty or 'null'".to_string())
            }
        }
        ScalarTag::String => Ok(Value::Text(raw.to_string())),
        ScalarTag::Int => raw.trim().parse().map(Value::Int).map_err(|e| e.to_string()),
        ScalarTag::Long => raw
            .trim()
            .parse()
            .map(Value::Long)
            .map_err(|e| e.to_string()),
        ScalarTag::Float => {
            let parsed: f32 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
            finite(f64::from(parsed))
        }
        ScalarTag::Double => {
            let parsed: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
            finite(parsed)
        }
        ScalarTag::Decimal => Decimal::from_str(raw.trim())
            .map(Value::Decimal)
            .map_err(|e| e.to_string()),
        ScalarTag::Bool => {
            let trimmed = raw.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err("expected 'true' or 'false'".to_string())
            }
        }
        ScalarTag::DateTime => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| e.to_string()),
        ScalarTag::ObjectId => ObjectId::parse_str(raw.trim())
            .map(Value::ObjectId)
            .map_err(|e| e.to_string()),
    }
}

fn finite(v: f64) -> Result<Value, String> {
    Float64::try_new(v)
        .map(Value::Double)
        .ok_or_else(|| "non-finite floating point literal".to_string())
}
