use crate::{
    acl::model::{ActorRef, AllReaders, AllUpdaters, Deleter, Field, Reader, Updater, UserPermissions},
    expr::FieldPath,
    obs::DslKind,
    schema::{ResourceSchema, SchemaViolation},
};

///
/// Privilege management
///
/// The only ways an aggregate changes after creation. A grant replaces the
/// actor's existing record; names are canonicalized and must be exposed by
/// the resource schema.
///

impl UserPermissions {
    /// Defaults for a newly created resource: the owner reads every readable
    /// field, updates every updatable field and may delete. Wildcards are off.
    #[must_use]
    pub fn for_owner(owner: ActorRef, schema: &ResourceSchema) -> Self {
        Self {
            readers: vec![Reader {
                actor: owner,
                is_permitted: true,
                fields: schema.readable_names().map(Field::granted).collect(),
            }],
            updaters: vec![Updater {
                actor: owner,
                is_permitted: true,
                fields: schema.updatable_names().map(Field::granted).collect(),
            }],
            deleters: vec![Deleter {
                actor: owner,
                is_permitted: true,
            }],
            ..Self::default()
        }
    }

    pub fn grant_read(
        &mut self,
        actor: ActorRef,
        fields: &[&str],
        schema: &ResourceSchema,
    ) -> Result<(), SchemaViolation> {
        let fields = readable_fields(fields, schema)?;

        self.revoke_read(&actor);
        self.readers.push(Reader {
            actor,
            is_permitted: true,
            fields,
        });

        Ok(())
    }

    pub fn grant_update(
        &mut self,
        actor: ActorRef,
        fields: &[&str],
        schema: &ResourceSchema,
    ) -> Result<(), SchemaViolation> {
        let fields = updatable_fields(fields, schema)?;

        self.revoke_update(&actor);
        self.updaters.push(Updater {
            actor,
            is_permitted: true,
            fields,
        });

        Ok(())
    }

    pub fn grant_delete(&mut self, actor: ActorRef) {
        self.revoke_delete(&actor);
        self.deleters.push(Deleter {
            actor,
            is_permitted: true,
        });
    }

    /// Drop the actor's reader record. Returns whether one existed.
    pub fn revoke_read(&mut self, actor: &ActorRef) -> bool {
        let before = self.readers.len();
        self.readers.retain(|r| r.actor != *actor);

        self.readers.len() != before
    }

    pub fn revoke_update(&mut self, actor: &ActorRef) -> bool {
        let before = self.updaters.len();
        self.updaters.retain(|u| u.actor != *actor);

        self.updaters.len() != before
    }

    pub fn revoke_delete(&mut self, actor: &ActorRef) -> bool {
        let before = self.deleters.len();
        self.deleters.retain(|d| d.actor != *actor);

        self.deleters.len() != before
    }

    pub fn set_all_readers(
        &mut self,
        are_permitted: bool,
        fields: &[&str],
        schema: &ResourceSchema,
    ) -> Result<(), SchemaViolation> {
        self.all_readers = AllReaders {
            are_permitted,
            fields: readable_fields(fields, schema)?,
        };

        Ok(())
    }

    pub fn set_all_updaters(
        &mut self,
        are_permitted: bool,
        fields: &[&str],
        schema: &ResourceSchema,
    ) -> Result<(), SchemaViolation> {
        self.all_updaters = AllUpdaters {
            are_permitted,
            fields: updatable_fields(fields, schema)?,
        };

        Ok(())
    }
}

fn readable_fields(raw: &[&str], schema: &ResourceSchema) -> Result<Vec<Field>, SchemaViolation> {
    grant_fields(raw, schema, DslKind::Filter, |name| {
        schema.readable_names().any(|n| n == name)
    })
}

fn updatable_fields(raw: &[&str], schema: &ResourceSchema) -> Result<Vec<Field>, SchemaViolation> {
    grant_fields(raw, schema, DslKind::Update, |name| {
        schema.updatable_names().any(|n| n == name)
    })
}

// Canonical, exposed, top-level and deduplicated, in the order given.
fn grant_fields(
    raw: &[&str],
    schema: &ResourceSchema,
    dsl: DslKind,
    exposed: impl Fn(&str) -> bool,
) -> Result<Vec<Field>, SchemaViolation> {
    let mut out: Vec<Field> = Vec::with_capacity(raw.len());

    for name in raw {
        let path = FieldPath::parse(name)
            .ok()
            .filter(|p| exposed(p.as_str()))
            .ok_or_else(|| SchemaViolation::InvalidField {
                resource: schema.name.clone(),
                dsl,
                field: (*name).to_string(),
            })?;

        if !out.iter().any(|f| f.name == path.as_str()) {
            out.push(Field::granted(path.as_str()));
        }
    }

    Ok(out)
}
