use crate::{
    expr::FieldPath,
    predicate::{CompareOp, Predicate},
    value::Value,
};
use serde_json::{Map, Value as Json, json};

///
/// Render a predicate as a document-store filter document.
///
/// True renders as the empty filter and False as a constant-false `$expr`.
/// Array cardinality uses `$size` for equality; ordering comparisons probe
/// positional paths (`field.N`) for existence, which the store can answer
/// without an aggregation.
///
#[must_use]
pub fn render(predicate: &Predicate) -> Json {
    match predicate {
        Predicate::True => json!({}),
        Predicate::False => json!({ "$expr": false }),

        Predicate::And(children) => json!({ "$and": render_all(children) }),
        Predicate::Or(children) => json!({ "$or": render_all(children) }),
        Predicate::Not(inner) => json!({ "$nor": [render(inner)] }),

        Predicate::Compare(cmp) => on_field(
            &cmp.field,
            operator_doc(cmp.op.operator(), cmp.value.to_extended_json()),
        ),
        Predicate::In { field, values } => on_field(field, operator_doc("$in", render_values(values))),
        Predicate::All { field, values } => {
            on_field(field, operator_doc("$all", render_values(values)))
        }
        Predicate::Regex { field, pattern } => on_field(field, json!({ "$regex": pattern })),
        Predicate::Exists { field, exists } => on_field(field, json!({ "$exists": exists })),
        Predicate::AnyElement { field, op, value } => on_field(
            field,
            json!({ "$elemMatch": operator_doc(op.operator(), value.to_extended_json()) }),
        ),
        Predicate::Size { field, op, len } => render_size(field, *op, *len),
        Predicate::ElemMatch { field, predicate } => {
            on_field(field, json!({ "$elemMatch": render(predicate) }))
        }
    }
}

fn render_all(children: &[Predicate]) -> Vec<Json> {
    children.iter().map(render).collect()
}

fn render_values(values: &[Value]) -> Json {
    Json::Array(values.iter().map(Value::to_extended_json).collect())
}

fn on_field(field: &FieldPath, condition: Json) -> Json {
    let mut doc = Map::new();
    doc.insert(field.to_string(), condition);
    Json::Object(doc)
}

fn operator_doc(operator: &str, operand: Json) -> Json {
    let mut doc = Map::new();
    doc.insert(operator.to_string(), operand);
    Json::Object(doc)
}

// `len(field) >= n` holds exactly when position n-1 exists.
fn has_position(field: &FieldPath, position: u64, exists: bool) -> Json {
    let mut doc = Map::new();
    doc.insert(format!("{field}.{position}"), json!({ "$exists": exists }));
    Json::Object(doc)
}

fn is_array(field: &FieldPath) -> Json {
    on_field(field, json!({ "$type": "array" }))
}

fn render_size(field: &FieldPath, op: CompareOp, len: u64) -> Json {
    match op {
        CompareOp::Eq => on_field(field, json!({ "$size": len })),
        CompareOp::Ne => json!({
            "$and": [is_array(field), on_field(field, json!({ "$not": { "$size": len } }))]
        }),
        CompareOp::Gt => has_position(field, len, true),
        CompareOp::Gte => match len.checked_sub(1) {
            Some(last) => has_position(field, last, true),
            None => is_array(field),
        },
        CompareOp::Lt => match len.checked_sub(1) {
            Some(last) => json!({ "$and": [is_array(field), has_position(field, last, false)] }),
            None => json!({ "$expr": false }),
        },
        CompareOp::Lte => json!({ "$and": [is_array(field), has_position(field, len, false)] }),
    }
}
