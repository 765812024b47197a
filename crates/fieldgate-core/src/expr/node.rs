use crate::expr::{ExprError, FieldPath, FilterOp, Leaf, OperationVocabulary};
use serde_json::json;
use std::{collections::BTreeSet, fmt};

///
/// BoolOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            _ => None,
        }
    }
}

///
/// ExpressionNode
///
/// Parsed filter tree. Both codecs produce this shape; it is immutable once
/// built and only consumed by the compiler and the validator.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExpressionNode {
    Leaf(Leaf<FilterOp>),
    Composite {
        operator: BoolOp,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl ExpressionNode {
    #[must_use]
    pub fn composite(operator: BoolOp, left: Self, right: Self) -> Self {
        Self::Composite {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Fold operands right-associatively: `[a, b, c]` becomes `a op (b op c)`.
    pub(crate) fn fold_right(operator: BoolOp, operands: Vec<Self>) -> Option<Self> {
        operands
            .into_iter()
            .rev()
            .reduce(|right, left| Self::composite(operator, left, right))
    }

    /// Every leaf, left to right.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Leaf<FilterOp>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf<FilterOp>>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Composite { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Composite { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Distinct fields referenced anywhere in the tree.
    #[must_use]
    pub fn fields(&self) -> BTreeSet<FieldPath> {
        self.leaves().into_iter().map(|l| l.field.clone()).collect()
    }

    ///
    /// ENCODING
    ///

    /// Nested JSON form. Chains of the same operator down the right spine
    /// flatten into one `filters` array.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Leaf(leaf) => json!({
                "field": leaf.field.as_str(),
                "operation": leaf.operation.label(),
                "type": leaf.ty.to_string(),
                "value": leaf.json_value(),
            }),
            Self::Composite { operator, .. } => {
                let mut filters = Vec::new();
                let mut current = self;
                while let Self::Composite {
                    operator: op,
                    left,
                    right,
                } = current
                {
                    if op != operator {
                        break;
                    }
                    filters.push(left.to_json());
                    current = right;
                }
                filters.push(current.to_json());

                json!({ "operation": operator.token(), "filters": filters })
            }
        }
    }

    /// String grammar form, checked: fails when a literal contains a token
    /// the grammar splits on, since the output would not parse back.
    pub fn encode(&self) -> Result<String, ExprError> {
        for leaf in self.leaves() {
            leaf.check_encodable(&[
                BoolOp::And.token(),
                BoolOp::Or.token(),
                "(",
                ")",
            ])?;
        }

        Ok(self.to_string())
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => write!(f, "{self}"),
            Self::Composite { .. } => write!(f, "({self})"),
        }
    }
}

/// String grammar form. Composite operands are always grouped, so every
/// level holds exactly two operands. Literals are written raw; use
/// [`ExpressionNode::encode`] when they may contain grammar tokens.
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{leaf}"),
            Self::Composite {
                operator,
                left,
                right,
            } => {
                left.fmt_operand(f)?;
                f.write_str(operator.token())?;
                right.fmt_operand(f)
            }
        }
    }
}
