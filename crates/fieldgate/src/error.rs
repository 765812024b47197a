use derive_more::Display;
use fieldgate_core::{
    error::{EngineError, ErrorClass, ErrorDetail, ErrorOrigin as CoreErrorOrigin},
    schema::SchemaViolation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        let kind = match (&err.class, &err.detail) {
            (ErrorClass::SchemaViolation, ErrorDetail::Schema(violation)) => {
                ErrorKind::Schema(violation.into())
            }
            (ErrorClass::ProtectedFieldViolation, _) => ErrorKind::ProtectedField,
            (ErrorClass::Configuration, _) => ErrorKind::Configuration,
            _ => ErrorKind::Expression(ExpressionErrorKind::Malformed),
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy. There is no permission-denied kind: an access
/// predicate that matches nothing yields an empty result, not an error.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Expression(ExpressionErrorKind),
    Schema(SchemaErrorKind),

    /// A mass update targets a protected field. No grant changes this.
    ProtectedField,

    Configuration,
}

///
/// ExpressionErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExpressionErrorKind {
    /// Syntax, arity, vocabulary or literal coercion failure.
    Malformed,
}

///
/// SchemaErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    InvalidField,
    InvalidType,
    InvalidOperation,
}

impl From<&SchemaViolation> for SchemaErrorKind {
    fn from(violation: &SchemaViolation) -> Self {
        match violation {
            SchemaViolation::InvalidField { .. } => Self::InvalidField,
            SchemaViolation::InvalidType { .. } => Self::InvalidType,
            SchemaViolation::InvalidOperation { .. } => Self::InvalidOperation,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Parse,
    Validate,
    Compile,
    Access,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Parse => Self::Parse,
            CoreErrorOrigin::Validate => Self::Validate,
            CoreErrorOrigin::Compile => Self::Compile,
            CoreErrorOrigin::Access => Self::Access,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}
