//! Per-resource field whitelists and the validator that enforces them.

mod catalog;
mod validate;

use crate::{acl::Field, expr::FieldPath};

// re-exports
pub use catalog::{CLIENT, USER, by_name};
pub use validate::{SchemaViolation, validate_filter, validate_terms, validate_update};

///
/// ResourceSchema
///
/// Whitelist sets one protected resource type exposes. Field names are
/// canonical top-level properties; a filter or update path is covered when
/// it equals a listed name or lies underneath it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceSchema {
    pub name: String,
    pub readable: Vec<Field>,
    pub updatable: Vec<Field>,
    pub protected: Vec<FieldPath>,
}

impl ResourceSchema {
    /// Build from static tables of canonical names.
    #[must_use]
    pub fn new(name: &str, readable: &[&str], updatable: &[&str], protected: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            readable: readable.iter().copied().map(Field::granted).collect(),
            updatable: updatable.iter().copied().map(Field::granted).collect(),
            protected: protected
                .iter()
                .copied()
                .map(FieldPath::from_canonical)
                .collect(),
        }
    }

    /// Readable names actually exposed.
    pub fn readable_names(&self) -> impl Iterator<Item = &str> {
        exposed(&self.readable)
    }

    /// Updatable names actually exposed.
    pub fn updatable_names(&self) -> impl Iterator<Item = &str> {
        exposed(&self.updatable)
    }

    #[must_use]
    pub fn is_readable(&self, path: &FieldPath) -> bool {
        covers(&self.readable, path)
    }

    #[must_use]
    pub fn is_updatable(&self, path: &FieldPath) -> bool {
        covers(&self.updatable, path)
    }

    /// Whether a mass update may not touch `path`.
    ///
    /// Writing a parent replaces its children, so a path above a protected
    /// one is protected as well.
    #[must_use]
    pub fn is_protected(&self, path: &FieldPath) -> bool {
        self.protected
            .iter()
            .any(|p| path.starts_with(p) || p.starts_with(path))
    }
}

fn exposed(fields: &[Field]) -> impl Iterator<Item = &str> {
    fields
        .iter()
        .filter(|f| f.is_permitted)
        .map(|f| f.name.as_str())
}

fn covers(fields: &[Field], path: &FieldPath) -> bool {
    exposed(fields).any(|name| name == path.root())
}

///
/// TESTS
///
