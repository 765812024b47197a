use crate::{
    config::DslConfig,
    expr::{BoolOp, ExprError, ExpressionNode, Leaf, OperationVocabulary},
};
use serde::Deserialize;
use serde_json::Value as Json;

///
/// JSON tree codec
///
/// A node is either a leaf `{field, operation, type, value}` or a group
/// `{operation: "&&" | "||", filters: [...]}`. Leaf values are reduced to
/// the same literal text the string grammar carries and coerced through the
/// same path, so both codecs build identical trees.
///

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupRepr {
    operation: String,
    filters: Vec<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LeafRepr {
    field: String,
    operation: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    value: Json,
}

impl LeafRepr {
    fn into_leaf<O: OperationVocabulary>(self, clause: &str) -> Result<Leaf<O>, ExprError> {
        let literal = json_literal(&self.value)?;
        Leaf::from_parts(&self.field, &self.operation, &self.ty, &literal, 0, clause)
    }
}

pub(crate) fn parse_filter_json(json: &Json, config: &DslConfig) -> Result<ExpressionNode, ExprError> {
    decode_node(json, 0, config.max_depth)
}

pub(crate) fn parse_filter_json_str(
    source: &str,
    config: &DslConfig,
) -> Result<ExpressionNode, ExprError> {
    if source.len() > config.max_source_len {
        return Err(ExprError::TooLong {
            len: source.len(),
            max: config.max_source_len,
        });
    }

    let json: Json = serde_json::from_str(source).map_err(json_error)?;
    parse_filter_json(&json, config)
}

/// Decode a JSON array of update leaves.
pub(crate) fn parse_update_leaves<O: OperationVocabulary>(json: &Json) -> Result<Vec<Leaf<O>>, ExprError> {
    let Json::Array(items) = json else {
        return Err(ExprError::Json {
            message: "update expression must be an array of leaves".to_string(),
        });
    };

    items
        .iter()
        .map(|item| {
            let repr = LeafRepr::deserialize(item).map_err(json_error)?;
            repr.into_leaf(&item.to_string())
        })
        .collect()
}

fn decode_node(json: &Json, depth: usize, max_depth: usize) -> Result<ExpressionNode, ExprError> {
    let is_group = json.as_object().is_some_and(|obj| obj.contains_key("filters"));
    if !is_group {
        let repr = LeafRepr::deserialize(json).map_err(json_error)?;
        return repr.into_leaf(&json.to_string()).map(ExpressionNode::Leaf);
    }

    if depth + 1 > max_depth {
        return Err(ExprError::TooDeep {
            offset: 0,
            max: max_depth,
        });
    }

    let group = GroupRepr::deserialize(json).map_err(json_error)?;
    let operator = BoolOp::from_token(&group.operation).ok_or_else(|| ExprError::GroupOperation {
        operation: group.operation.clone(),
    })?;

    let children = group
        .filters
        .iter()
        .map(|child| decode_node(child, depth + 1, max_depth))
        .collect::<Result<Vec<_>, _>>()?;

    ExpressionNode::fold_right(operator, children).ok_or(ExprError::EmptyGroup { offset: 0 })
}

// Render a JSON leaf value as the literal the string grammar would carry.
fn json_literal(value: &Json) -> Result<String, ExprError> {
    match value {
        Json::Array(items) => items
            .iter()
            .map(array_element)
            .collect::<Result<Vec<_>, _>>()
            .map(|elements| elements.join(",")),
        _ => Ok(scalar_literal(value)),
    }
}

// Array elements are joined on ',' and split again by coercion, so an
// element may neither contain one nor nest.
fn array_element(value: &Json) -> Result<String, ExprError> {
    if matches!(value, Json::Array(_) | Json::Object(_)) {
        return Err(ExprError::Json {
            message: format!("array element {value} must be a scalar"),
        });
    }

    let literal = scalar_literal(value);
    if literal.contains(',') {
        return Err(ExprError::Json {
            message: format!("array element '{literal}' contains ','"),
        });
    }

    Ok(literal)
}

fn scalar_literal(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::Array(_) | Json::Object(_) => value.to_string(),
    }
}

fn json_error(err: serde_json::Error) -> ExprError {
    ExprError::Json {
        message: err.to_string(),
    }
}
