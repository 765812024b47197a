use crate::{
    mutation::{Mutation, MutationOp},
    predicate,
    types::Float64,
    value::Value,
};
use serde_json::{Map, Value as Json, json};

///
/// Render a mutation as a document-store update document.
///
/// Operations are grouped under their update operator, keyed by path.
///
#[must_use]
pub fn render(mutation: &Mutation) -> Json {
    let mut doc: Map<String, Json> = Map::new();

    for m in &mutation.ops {
        let operand = match &m.op {
            MutationOp::Inc(n) | MutationOp::Max(n) | MutationOp::Min(n) | MutationOp::Mul(n) => {
                number(*n)
            }
            MutationOp::PopFirst => json!(-1),
            MutationOp::PopLast => json!(1),
            MutationOp::Pull(value) | MutationOp::Push(value) | MutationOp::Set(value) => {
                value.to_extended_json()
            }
            MutationOp::PullAll(values) => values_json(values),
            MutationOp::PullFilter(pred) => predicate::render(pred),
            MutationOp::PushEach(values) => json!({ "$each": values_json(values) }),
            MutationOp::Rename(target) => Json::String(target.to_string()),
            MutationOp::Unset => Json::String(String::new()),
        };

        let group = doc
            .entry(m.op.operator())
            .or_insert_with(|| Json::Object(Map::new()));
        if let Json::Object(fields) = group {
            fields.insert(m.field.to_string(), operand);
        }
    }

    Json::Object(doc)
}

fn values_json(values: &[Value]) -> Json {
    Json::Array(values.iter().map(Value::to_extended_json).collect())
}

// Integral operands render as integers so the store keeps integer fields
// integral.
#[expect(clippy::cast_possible_truncation)]
fn number(n: Float64) -> Json {
    let v = n.get();
    if n.is_integral() && v.abs() < 9_007_199_254_740_992.0 {
        json!(v as i64)
    } else {
        json!(v)
    }
}
