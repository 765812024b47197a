use crate::{
    config::DslConfig,
    expr::{ExprError, FieldPath, Leaf, OperationVocabulary, UpdateOp},
    value::Value,
};
use serde_json::json;
use std::collections::BTreeSet;

///
/// UpdateList
///
/// Ordered, non-empty list of update leaves. Leaves are never combined with
/// boolean operators: every one of them is applied.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateList {
    leaves: Vec<Leaf<UpdateOp>>,
}

impl UpdateList {
    pub fn new(leaves: Vec<Leaf<UpdateOp>>) -> Result<Self, ExprError> {
        if leaves.is_empty() {
            return Err(ExprError::Empty);
        }

        Ok(Self { leaves })
    }

    #[must_use]
    pub fn leaves(&self) -> &[Leaf<UpdateOp>] {
        &self.leaves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Every field the update touches, rename targets included.
    #[must_use]
    pub fn fields(&self) -> BTreeSet<FieldPath> {
        let mut out = BTreeSet::new();
        for leaf in &self.leaves {
            out.insert(leaf.field.clone());
            if let Some(target) = rename_target(leaf) {
                out.insert(target);
            }
        }

        out
    }

    /// Re-encode with the given apply-all separator. Fails when a literal
    /// contains a token the grammar splits on.
    pub fn encode(&self, separator: &str) -> Result<String, ExprError> {
        for leaf in &self.leaves {
            leaf.check_encodable(&[separator])?;
        }

        Ok(self
            .leaves
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator))
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.leaves
                .iter()
                .map(|leaf| {
                    json!({
                        "field": leaf.field.as_str(),
                        "operation": leaf.operation.label(),
                        "type": leaf.ty.to_string(),
                        "value": leaf.json_value(),
                    })
                })
                .collect(),
        )
    }
}

/// Canonical target path of a `Rename` leaf, when it is one.
fn rename_target(leaf: &Leaf<UpdateOp>) -> Option<FieldPath> {
    match (&leaf.operation, &leaf.value) {
        (UpdateOp::Rename, Value::Text(target)) => FieldPath::parse(target).ok(),
        _ => None,
    }
}

pub(crate) fn parse_update_source(source: &str, config: &DslConfig) -> Result<UpdateList, ExprError> {
    if source.len() > config.max_source_len {
        return Err(ExprError::TooLong {
            len: source.len(),
            max: config.max_source_len,
        });
    }
    if source.trim().is_empty() {
        return Err(ExprError::Empty);
    }

    let separator = config.apply_all_separator.as_str();
    let mut leaves = Vec::new();
    let mut offset = 0;

    for fragment in source.split(separator) {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return Err(ExprError::EmptyClause { offset });
        }

        let lead = fragment.len() - fragment.trim_start().len();
        leaves.push(Leaf::parse_clause(trimmed, offset + lead)?);
        offset += fragment.len() + separator.len();
    }

    UpdateList::new(leaves)
}
