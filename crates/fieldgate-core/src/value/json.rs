use crate::{
    types::Float64,
    value::{Document, Value},
};
use chrono::SecondsFormat;
use serde_json::{Map, Number, json};

///
/// Extended JSON
///
/// Backend rendering of typed values. Scalars that plain JSON cannot carry
/// without losing their type use the `$`-prefixed wrappers a document store
/// understands.
///

impl Value {
    #[must_use]
    pub fn to_extended_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::DateTime(dt) => {
                json!({ "$date": dt.to_rfc3339_opts(SecondsFormat::Millis, true) })
            }
            Self::Decimal(d) => json!({ "$numberDecimal": d.to_string() }),
            Self::Document(doc) => serde_json::Value::Object(
                doc.iter()
                    .map(|(k, v)| (k.clone(), v.to_extended_json()))
                    .collect(),
            ),
            Self::Double(f) => {
                Number::from_f64(f.get()).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            Self::Int(n) => serde_json::Value::from(*n),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_extended_json).collect())
            }
            Self::Long(n) => json!({ "$numberLong": n.to_string() }),
            Self::Null => serde_json::Value::Null,
            Self::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Untyped conversion from plain JSON, used to load stored documents.
    ///
    /// Integers narrow to `Int` when they fit; other numbers become `Long`
    /// or `Double`.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => from_number(n),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Document(document_from_map(map)),
        }
    }
}

fn from_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(Value::Long(i), Value::Int);
    }

    n.as_f64()
        .and_then(Float64::try_new)
        .map_or(Value::Null, Value::Double)
}

fn document_from_map(map: &Map<String, serde_json::Value>) -> Document {
    map.iter()
        .map(|(k, v)| (k.clone(), Value::from_json(v)))
        .collect()
}
