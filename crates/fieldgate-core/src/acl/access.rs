use crate::{
    acl::model::{ActorRef, Field, UserPermissions, keys},
    config::{AccessConfig, ConfigError, DEFAULT_PERMISSIONS_PATH},
    expr::FieldPath,
    obs::{
        AccessKind,
        sink::{MetricsEvent, record},
    },
    predicate::{CompareOp, Predicate},
    schema::ResourceSchema,
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// ProtectedFieldViolation
///
/// A mass update touches a field no grant can unlock.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("field '{field}' of '{resource}' is protected against mass update")]
pub struct ProtectedFieldViolation {
    pub resource: String,
    pub field: String,
}

///
/// AccessPredicateBuilder
///
/// Builds the predicate that limits a read, update or delete to resources
/// whose embedded permission aggregate grants the actor access. Pure: the
/// aggregate is only ever addressed by path, never read here.
///
/// Field coverage is decided per top-level property, the unit grants are
/// expressed in.
///

#[derive(Clone, Debug)]
pub struct AccessPredicateBuilder<'a> {
    schema: &'a ResourceSchema,
    paths: PermissionPaths,
}

impl<'a> AccessPredicateBuilder<'a> {
    pub fn new(schema: &'a ResourceSchema, permissions_path: &str) -> Result<Self, ConfigError> {
        let base = FieldPath::parse(permissions_path)
            .ok()
            .filter(|p| p.as_str() == permissions_path)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "access.permissions_path",
                message: format!("'{permissions_path}' is not a canonical field path"),
            })?;

        Ok(Self {
            schema,
            paths: PermissionPaths::new(&base),
        })
    }

    /// Builder over the aggregate at the default path.
    #[must_use]
    pub fn for_schema(schema: &'a ResourceSchema) -> Self {
        Self {
            schema,
            paths: PermissionPaths::new(&relative(DEFAULT_PERMISSIONS_PATH)),
        }
    }

    pub fn from_config(schema: &'a ResourceSchema, config: &AccessConfig) -> Result<Self, ConfigError> {
        Self::new(schema, &config.permissions_path)
    }

    #[must_use]
    pub const fn schema(&self) -> &'a ResourceSchema {
        self.schema
    }

    /// Read access: every `required` field and at least one `optional` field
    /// (when any are given) must be covered by the actor's reader grant or by
    /// the wildcard.
    #[must_use]
    pub fn read<'f>(
        &self,
        actor: &ActorRef,
        required: impl IntoIterator<Item = &'f FieldPath>,
        optional: impl IntoIterator<Item = &'f FieldPath>,
    ) -> Predicate {
        let required = roots(required);
        let optional = roots(optional);

        let grant = Predicate::and(
            actor_terms(actor)
                .into_iter()
                .chain(coverage(&relative(keys::FIELDS), &required, &optional))
                .collect(),
        );
        let scoped = Predicate::and(vec![
            Predicate::size(self.paths.readers.clone(), CompareOp::Gt, 0),
            Predicate::elem_match(self.paths.readers.clone(), grant),
        ]);

        let wildcard = Predicate::and(
            std::iter::once(Predicate::eq(self.paths.all_readers_permitted.clone(), true))
                .chain(coverage(&self.paths.all_readers_fields, &required, &optional))
                .collect(),
        );

        record(MetricsEvent::AccessPredicateBuilt {
            access: AccessKind::Read,
        });

        Predicate::or(vec![scoped, wildcard])
    }

    /// Update access for exactly the fields a mutation touches.
    ///
    /// Protected fields are rejected before any predicate is built; no grant
    /// can satisfy them.
    pub fn update<'f>(
        &self,
        actor: &ActorRef,
        fields: impl IntoIterator<Item = &'f FieldPath>,
    ) -> Result<Predicate, ProtectedFieldViolation> {
        let fields: Vec<&FieldPath> = fields.into_iter().collect();

        if let Some(field) = fields.iter().find(|f| self.schema.is_protected(f)) {
            record(MetricsEvent::ProtectedFieldRejected);

            return Err(ProtectedFieldViolation {
                resource: self.schema.name.clone(),
                field: field.to_string(),
            });
        }

        let required = roots(fields);
        let none = BTreeSet::new();

        let grant = Predicate::and(
            actor_terms(actor)
                .into_iter()
                .chain(coverage(&relative(keys::FIELDS), &required, &none))
                .collect(),
        );
        let scoped = Predicate::and(vec![
            Predicate::size(self.paths.updaters.clone(), CompareOp::Gt, 0),
            Predicate::elem_match(self.paths.updaters.clone(), grant),
        ]);

        let wildcard = Predicate::and(
            std::iter::once(Predicate::eq(self.paths.all_updaters_permitted.clone(), true))
                .chain(coverage(&self.paths.all_updaters_fields, &required, &none))
                .collect(),
        );

        record(MetricsEvent::AccessPredicateBuilt {
            access: AccessKind::Update,
        });

        Ok(Predicate::or(vec![scoped, wildcard]))
    }

    /// Delete access. Only an explicit deleter record grants it.
    #[must_use]
    pub fn delete(&self, actor: &ActorRef) -> Predicate {
        record(MetricsEvent::AccessPredicateBuilt {
            access: AccessKind::Delete,
        });

        Predicate::elem_match(self.paths.deleters.clone(), Predicate::and(actor_terms(actor)))
    }
}

///
/// PermissionPaths
///
/// Absolute paths into the aggregate stored under the configured base.
///

#[derive(Clone, Debug)]
struct PermissionPaths {
    readers: FieldPath,
    all_readers_permitted: FieldPath,
    all_readers_fields: FieldPath,
    updaters: FieldPath,
    all_updaters_permitted: FieldPath,
    all_updaters_fields: FieldPath,
    deleters: FieldPath,
}

impl PermissionPaths {
    fn new(base: &FieldPath) -> Self {
        let at = |parts: &[&str]| base.join(&relative(&parts.join(".")));

        Self {
            readers: at(&[keys::READERS]),
            all_readers_permitted: at(&[keys::ALL_READERS, keys::ARE_PERMITTED]),
            all_readers_fields: at(&[keys::ALL_READERS, keys::FIELDS]),
            updaters: at(&[keys::UPDATERS]),
            all_updaters_permitted: at(&[keys::ALL_UPDATERS, keys::ARE_PERMITTED]),
            all_updaters_fields: at(&[keys::ALL_UPDATERS, keys::FIELDS]),
            deleters: at(&[keys::DELETERS]),
        }
    }
}

fn relative(path: &str) -> FieldPath {
    FieldPath::from_canonical(path)
}

fn roots<'f>(fields: impl IntoIterator<Item = &'f FieldPath>) -> BTreeSet<&'f str> {
    fields.into_iter().map(FieldPath::root).collect()
}

// Terms an element of `readers`, `updaters` or `deleters` must satisfy to
// belong to `actor`.
fn actor_terms(actor: &ActorRef) -> Vec<Predicate> {
    vec![
        Predicate::eq(
            relative(&format!("{}.{}", keys::ACTOR, keys::AUTHOR_ID)),
            actor.author_id,
        ),
        Predicate::eq(
            relative(&format!("{}.{}", keys::ACTOR, keys::AUTHOR_TYPE)),
            actor.author_type.label(),
        ),
        Predicate::eq(relative(keys::IS_PERMITTED), true),
    ]
}

// Every required name covered, and one optional name when any are given.
fn coverage(fields: &FieldPath, required: &BTreeSet<&str>, optional: &BTreeSet<&str>) -> Vec<Predicate> {
    let mut terms: Vec<Predicate> = required.iter().map(|name| covers(fields, name)).collect();

    if !optional.is_empty() {
        terms.push(Predicate::or(
            optional.iter().map(|name| covers(fields, name)).collect(),
        ));
    }

    terms
}

fn covers(fields: &FieldPath, name: &str) -> Predicate {
    Predicate::elem_match(
        fields.clone(),
        Predicate::and(vec![
            Predicate::eq(relative(keys::NAME), name),
            Predicate::eq(relative(keys::IS_PERMITTED), true),
        ]),
    )
}

///
/// Direct checks
///
/// The same decisions taken against an in-memory aggregate, without going
/// through a predicate.
///

impl UserPermissions {
    #[must_use]
    pub fn allows_read<'f>(
        &self,
        actor: &ActorRef,
        required: impl IntoIterator<Item = &'f FieldPath>,
        optional: impl IntoIterator<Item = &'f FieldPath>,
    ) -> bool {
        let required = roots(required);
        let optional = roots(optional);
        let satisfies = |fields: &[Field]| {
            required.iter().all(|name| granted(fields, name))
                && (optional.is_empty() || optional.iter().any(|name| granted(fields, name)))
        };

        self.readers
            .iter()
            .any(|r| r.actor == *actor && r.is_permitted && satisfies(&r.fields))
            || (self.all_readers.are_permitted && satisfies(&self.all_readers.fields))
    }

    #[must_use]
    pub fn allows_update<'f>(
        &self,
        actor: &ActorRef,
        fields: impl IntoIterator<Item = &'f FieldPath>,
    ) -> bool {
        let required = roots(fields);
        let satisfies = |fields: &[Field]| required.iter().all(|name| granted(fields, name));

        self.updaters
            .iter()
            .any(|u| u.actor == *actor && u.is_permitted && satisfies(&u.fields))
            || (self.all_updaters.are_permitted && satisfies(&self.all_updaters.fields))
    }

    #[must_use]
    pub fn allows_delete(&self, actor: &ActorRef) -> bool {
        self.deleters
            .iter()
            .any(|d| d.actor == *actor && d.is_permitted)
    }
}

fn granted(fields: &[Field], name: &str) -> bool {
    fields.iter().any(|f| f.name == name && f.is_permitted)
}
