use crate::{
    expr::{ExpressionNode, FieldPath, FilterOp, OperationVocabulary, UpdateList, UpdateOp},
    obs::{
        DslKind,
        sink::{MetricsEvent, record},
    },
    schema::ResourceSchema,
    value::TypeTag,
};
use thiserror::Error as ThisError;

///
/// SchemaViolation
///
/// A term outside the resource's whitelist. Kept apart from malformed
/// expressions: the input parsed, but names something the resource does not
/// expose.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaViolation {
    #[error("field '{field}' is not exposed to {} expressions on '{resource}'", dsl.label())]
    InvalidField {
        resource: String,
        dsl: DslKind,
        field: String,
    },

    #[error("type '{tag}' is not a known type")]
    InvalidType { tag: String },

    #[error("operation '{operation}' is not a {} operation", dsl.label())]
    InvalidOperation { dsl: DslKind, operation: String },
}

/// Check raw terms against the whitelist before anything is parsed.
///
/// Fields are checked against the readable set for filters and the updatable
/// set for updates. Terms are checked in order: fields, types, operations.
pub fn validate_terms(
    dsl: DslKind,
    fields: &[&str],
    types: &[&str],
    operations: &[&str],
    schema: &ResourceSchema,
) -> Result<(), SchemaViolation> {
    let result = check_terms(dsl, fields, types, operations, schema);
    observe(dsl, &result);

    result
}

/// Check every field a parsed filter references.
pub fn validate_filter(node: &ExpressionNode, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
    let result = node
        .fields()
        .iter()
        .try_for_each(|field| check_field(DslKind::Filter, field, schema));
    observe(DslKind::Filter, &result);

    result
}

/// Check every field a parsed update writes, rename targets included.
pub fn validate_update(list: &UpdateList, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
    let result = list
        .fields()
        .iter()
        .try_for_each(|field| check_field(DslKind::Update, field, schema));
    observe(DslKind::Update, &result);

    result
}

fn check_terms(
    dsl: DslKind,
    fields: &[&str],
    types: &[&str],
    operations: &[&str],
    schema: &ResourceSchema,
) -> Result<(), SchemaViolation> {
    for raw in fields {
        let field = FieldPath::parse(raw).map_err(|_| invalid_field(dsl, raw, schema))?;
        check_field(dsl, &field, schema)?;
    }

    if let Some(tag) = types.iter().find(|t| !TypeTag::is_known(t)) {
        return Err(SchemaViolation::InvalidType {
            tag: (*tag).to_string(),
        });
    }

    let known = |op: &str| match dsl {
        DslKind::Filter => FilterOp::parse(op).is_some(),
        DslKind::Update => UpdateOp::parse(op).is_some(),
    };
    if let Some(op) = operations.iter().find(|op| !known(op)) {
        return Err(SchemaViolation::InvalidOperation {
            dsl,
            operation: (*op).to_string(),
        });
    }

    Ok(())
}

fn check_field(dsl: DslKind, field: &FieldPath, schema: &ResourceSchema) -> Result<(), SchemaViolation> {
    let allowed = match dsl {
        DslKind::Filter => schema.is_readable(field),
        DslKind::Update => schema.is_updatable(field),
    };

    if allowed {
        Ok(())
    } else {
        Err(invalid_field(dsl, field.as_str(), schema))
    }
}

fn invalid_field(dsl: DslKind, field: &str, schema: &ResourceSchema) -> SchemaViolation {
    SchemaViolation::InvalidField {
        resource: schema.name.clone(),
        dsl,
        field: field.to_string(),
    }
}

fn observe(dsl: DslKind, result: &Result<(), SchemaViolation>) {
    if result.is_err() {
        record(MetricsEvent::SchemaRejected { dsl });
    }
}
