//! Access sessions: one actor working against one resource type.

use crate::{
    acl::{AccessPredicateBuilder, ActorRef},
    config::EngineConfig,
    error::EngineError,
    expr::{FieldPath, FilterSource, parse_filter, parse_update},
    mutation::compile_update,
    obs::DslKind,
    plan::{RetrievePlan, UpdatePlan},
    predicate::{Predicate, compile_filter, normalize},
    schema::{ResourceSchema, validate_filter, validate_terms, validate_update},
};
use std::collections::BTreeSet;

///
/// AccessSession
///
/// Runs caller input through parse, whitelist validation and compilation,
/// then scopes the result with the actor's access predicate. Nothing here
/// talks to storage; the returned plans do.
///

#[derive(Clone, Debug)]
pub struct AccessSession<'a> {
    actor: ActorRef,
    config: &'a EngineConfig,
    access: AccessPredicateBuilder<'a>,
}

impl<'a> AccessSession<'a> {
    pub fn new(
        schema: &'a ResourceSchema,
        actor: ActorRef,
        config: &'a EngineConfig,
    ) -> Result<Self, EngineError> {
        let access = AccessPredicateBuilder::from_config(schema, &config.access)?;

        Ok(Self {
            actor,
            config,
            access,
        })
    }

    #[must_use]
    pub const fn actor(&self) -> &ActorRef {
        &self.actor
    }

    #[must_use]
    pub const fn schema(&self) -> &'a ResourceSchema {
        self.access.schema()
    }

    /// Scoped read.
    ///
    /// Every field the filter references must be readable by the actor; at
    /// least one projected field must be.
    pub fn read(
        &self,
        filter: Option<FilterSource<'_>>,
        projection: &[&str],
    ) -> Result<RetrievePlan, EngineError> {
        validate_terms(DslKind::Filter, projection, &[], &[], self.schema())?;
        let projection: BTreeSet<FieldPath> = projection
            .iter()
            .filter_map(|raw| FieldPath::parse(raw).ok())
            .collect();

        let (filter, required) = self.filter(filter)?;
        let access = self.access.read(&self.actor, &required, &projection);

        Ok(RetrievePlan {
            predicate: normalize(&(filter & access)),
            projection: projection.into_iter().collect(),
            page: None,
        })
    }

    /// Scoped update. The update may only touch fields the actor may update,
    /// and never a protected one.
    ///
    /// The protected-field guard runs straight after parsing, so a protected
    /// field is reported as such even when the schema does not expose it.
    pub fn update(
        &self,
        filter: Option<FilterSource<'_>>,
        update: &str,
    ) -> Result<UpdatePlan, EngineError> {
        let list = parse_update(update, &self.config.dsl)?;
        let access = self.access.update(&self.actor, &list.fields())?;

        validate_update(&list, self.schema())?;
        let mutation = compile_update(&list, &self.config.dsl)?;
        let (filter, _) = self.filter(filter)?;

        Ok(UpdatePlan {
            predicate: normalize(&(filter & access)),
            mutation,
        })
    }

    /// Scoped delete.
    pub fn delete(&self, filter: Option<FilterSource<'_>>) -> Result<Predicate, EngineError> {
        let (filter, _) = self.filter(filter)?;
        let access = self.access.delete(&self.actor);

        Ok(normalize(&(filter & access)))
    }

    // Compiled filter and the fields it references. No filter matches
    // everything.
    fn filter(
        &self,
        source: Option<FilterSource<'_>>,
    ) -> Result<(Predicate, BTreeSet<FieldPath>), EngineError> {
        let Some(source) = source else {
            return Ok((Predicate::True, BTreeSet::new()));
        };

        let node = parse_filter(source, &self.config.dsl)?;
        validate_filter(&node, self.schema())?;
        let predicate = compile_filter(&node)?;

        Ok((predicate, node.fields()))
    }
}
