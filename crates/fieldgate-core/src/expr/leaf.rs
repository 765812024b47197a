use crate::{
    expr::{ExprError, FieldPath, OperationVocabulary},
    value::{TypeTag, Value, coerce},
};
use std::fmt;

pub(crate) const PART_SEPARATOR: &str = "::";

///
/// Leaf
///
/// One `(field, operation, typed value)` clause. The type tag is kept so the
/// clause can be re-encoded exactly.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Leaf<O> {
    pub field: FieldPath,
    pub operation: O,
    pub ty: TypeTag,
    pub value: Value,
}

impl<O: OperationVocabulary> Leaf<O> {
    #[must_use]
    pub const fn new(field: FieldPath, operation: O, ty: TypeTag, value: Value) -> Self {
        Self {
            field,
            operation,
            ty,
            value,
        }
    }

    /// Parse a `field::operation::value::type` clause.
    ///
    /// The clause must split into exactly four parts; the value part may be
    /// empty.
    pub(crate) fn parse_clause(clause: &str, offset: usize) -> Result<Self, ExprError> {
        let parts: Vec<&str> = clause.split(PART_SEPARATOR).collect();
        let [field, operation, literal, ty] = parts.as_slice() else {
            return Err(ExprError::LeafArity {
                offset,
                clause: clause.to_string(),
                parts: parts.len(),
            });
        };

        Self::from_parts(field, operation, ty, literal, offset, clause)
    }

    /// Build a leaf from its four raw parts, coercing the literal.
    pub(crate) fn from_parts(
        field: &str,
        operation: &str,
        ty: &str,
        literal: &str,
        offset: usize,
        clause: &str,
    ) -> Result<Self, ExprError> {
        let field = FieldPath::parse(field).map_err(|message| ExprError::InvalidField {
            offset,
            clause: clause.to_string(),
            message,
        })?;

        let operation = O::parse(operation.trim()).ok_or_else(|| ExprError::UnknownOperation {
            offset,
            clause: clause.to_string(),
            operation: operation.to_string(),
        })?;

        let coercion = |source| ExprError::Coercion {
            offset,
            clause: clause.to_string(),
            source,
        };
        let ty: TypeTag = ty.trim().parse().map_err(coercion)?;
        let value = coerce(literal, ty).map_err(coercion)?;

        Ok(Self::new(field, operation, ty, value))
    }

    /// The DSL literal this leaf's value was coerced from.
    #[must_use]
    pub fn literal(&self) -> String {
        self.value.to_literal()
    }

    /// The literal as the nested JSON codec carries it: arrays keep their
    /// elements apart instead of joining them on `,`.
    #[must_use]
    pub fn json_value(&self) -> serde_json::Value {
        match &self.value {
            Value::List(items) => items
                .iter()
                .map(|item| serde_json::Value::String(item.to_literal()))
                .collect(),
            _ => serde_json::Value::String(self.literal()),
        }
    }

    /// Check that the literal survives a trip through the string grammar,
    /// given the tokens the enclosing encoding splits on.
    pub(crate) fn check_encodable(&self, reserved: &[&str]) -> Result<(), ExprError> {
        let literal = self.literal();
        let element_split = self.ty.array
            && self
                .value
                .as_list()
                .is_some_and(|items| items.iter().any(|item| item.to_literal().contains(',')));
        let clashes = literal.contains(PART_SEPARATOR)
            || literal.ends_with(':')
            || reserved.iter().any(|token| literal.contains(token));

        if clashes || element_split {
            return Err(ExprError::Unencodable {
                field: self.field.to_string(),
                literal,
            });
        }

        Ok(())
    }
}

impl<O: OperationVocabulary> fmt::Display for Leaf<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{PART_SEPARATOR}{}{PART_SEPARATOR}{}{PART_SEPARATOR}{}",
            self.field,
            self.operation.label(),
            self.literal(),
            self.ty
        )
    }
}
