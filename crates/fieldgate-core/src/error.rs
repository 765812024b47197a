use crate::{
    acl::ProtectedFieldViolation, config::ConfigError, expr::ExprError,
    predicate::CompileError, schema::SchemaViolation, value::CoercionError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
///
/// Structured engine error with a stable classification.
/// Every stage error converts into this type; `detail` keeps the stage
/// error itself for callers that need its fields.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct EngineError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub detail: ErrorDetail,
}

impl EngineError {
    fn new(class: ErrorClass, origin: ErrorOrigin, detail: ErrorDetail) -> Self {
        Self {
            class,
            origin,
            message: detail.to_string(),
            detail,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.class, ErrorClass::MalformedExpression)
    }
}

impl From<ExprError> for EngineError {
    fn from(err: ExprError) -> Self {
        Self::new(
            ErrorClass::MalformedExpression,
            ErrorOrigin::Parse,
            ErrorDetail::Expr(err),
        )
    }
}

impl From<CoercionError> for EngineError {
    fn from(err: CoercionError) -> Self {
        Self::new(
            ErrorClass::MalformedExpression,
            ErrorOrigin::Parse,
            ErrorDetail::Coercion(err),
        )
    }
}

impl From<CompileError> for EngineError {
    fn from(err: CompileError) -> Self {
        Self::new(
            ErrorClass::MalformedExpression,
            ErrorOrigin::Compile,
            ErrorDetail::Compile(err),
        )
    }
}

impl From<SchemaViolation> for EngineError {
    fn from(err: SchemaViolation) -> Self {
        Self::new(
            ErrorClass::SchemaViolation,
            ErrorOrigin::Validate,
            ErrorDetail::Schema(err),
        )
    }
}

impl From<ProtectedFieldViolation> for EngineError {
    fn from(err: ProtectedFieldViolation) -> Self {
        Self::new(
            ErrorClass::ProtectedFieldViolation,
            ErrorOrigin::Access,
            ErrorDetail::Protected(err),
        )
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::new(
            ErrorClass::Configuration,
            ErrorOrigin::Config,
            ErrorDetail::Config(err),
        )
    }
}

///
/// ErrorDetail
///
/// The stage error an [`EngineError`] was built from.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Expr(ExprError),

    #[error("{0}")]
    Coercion(CoercionError),

    #[error("{0}")]
    Compile(CompileError),

    #[error("{0}")]
    Schema(SchemaViolation),

    #[error("{0}")]
    Protected(ProtectedFieldViolation),

    #[error("{0}")]
    Config(ConfigError),
}

///
/// ErrorClass
/// Engine error taxonomy. There is no permission-denied class: an access
/// predicate that matches nothing is not an error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    MalformedExpression,
    SchemaViolation,
    ProtectedFieldViolation,
    Configuration,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MalformedExpression => "malformed_expression",
            Self::SchemaViolation => "schema_violation",
            Self::ProtectedFieldViolation => "protected_field_violation",
            Self::Configuration => "configuration",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Parse,
    Validate,
    Compile,
    Access,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::Compile => "compile",
            Self::Access => "access",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
