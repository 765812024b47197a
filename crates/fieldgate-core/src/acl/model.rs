use crate::{
    types::ObjectId,
    value::{Document, FieldValue, Value},
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Field
///
/// Grant or denial of one schema property.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub is_permitted: bool,
}

impl Field {
    #[must_use]
    pub fn granted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_permitted: true,
        }
    }

    #[must_use]
    pub fn denied(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_permitted: false,
        }
    }
}

impl FieldValue for Field {
    fn to_value(&self) -> Value {
        Value::Document(Document::from([
            (keys::NAME.to_string(), Value::text(&self.name)),
            (keys::IS_PERMITTED.to_string(), Value::Bool(self.is_permitted)),
        ]))
    }
}

///
/// AuthorType
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AuthorType {
    User,
    Client,
}

impl AuthorType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Client => "Client",
        }
    }
}

impl fmt::Display for AuthorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// ActorRef
///
/// Verified identity a grant applies to. Supplied by the identity layer and
/// trusted as-is.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub author_id: ObjectId,
    pub author_type: AuthorType,
}

impl ActorRef {
    #[must_use]
    pub const fn new(author_id: ObjectId, author_type: AuthorType) -> Self {
        Self {
            author_id,
            author_type,
        }
    }

    #[must_use]
    pub const fn user(author_id: ObjectId) -> Self {
        Self::new(author_id, AuthorType::User)
    }

    #[must_use]
    pub const fn client(author_id: ObjectId) -> Self {
        Self::new(author_id, AuthorType::Client)
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.author_type, self.author_id)
    }
}

impl FieldValue for ActorRef {
    fn to_value(&self) -> Value {
        Value::Document(Document::from([
            (keys::AUTHOR_ID.to_string(), Value::ObjectId(self.author_id)),
            (
                keys::AUTHOR_TYPE.to_string(),
                Value::text(self.author_type.label()),
            ),
        ]))
    }
}

///
/// Reader
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reader {
    pub actor: ActorRef,
    pub is_permitted: bool,
    pub fields: Vec<Field>,
}

impl FieldValue for Reader {
    fn to_value(&self) -> Value {
        scoped_grant(&self.actor, self.is_permitted, &self.fields)
    }
}

///
/// Updater
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Updater {
    pub actor: ActorRef,
    pub is_permitted: bool,
    pub fields: Vec<Field>,
}

impl FieldValue for Updater {
    fn to_value(&self) -> Value {
        scoped_grant(&self.actor, self.is_permitted, &self.fields)
    }
}

///
/// Deleter
///
/// Whole-resource delete grant. Deletion has no field scope and no
/// wildcard form.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleter {
    pub actor: ActorRef,
    pub is_permitted: bool,
}

impl FieldValue for Deleter {
    fn to_value(&self) -> Value {
        Value::Document(Document::from([
            (keys::ACTOR.to_string(), self.actor.to_value()),
            (keys::IS_PERMITTED.to_string(), Value::Bool(self.is_permitted)),
        ]))
    }
}

///
/// AllReaders
///
/// Actor-independent read grant.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllReaders {
    pub are_permitted: bool,
    pub fields: Vec<Field>,
}

impl FieldValue for AllReaders {
    fn to_value(&self) -> Value {
        wildcard_grant(self.are_permitted, &self.fields)
    }
}

///
/// AllUpdaters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllUpdaters {
    pub are_permitted: bool,
    pub fields: Vec<Field>,
}

impl FieldValue for AllUpdaters {
    fn to_value(&self) -> Value {
        wildcard_grant(self.are_permitted, &self.fields)
    }
}

///
/// UserPermissions
///
/// Permission aggregate embedded in every protected resource. The default
/// value is the fully initialized empty aggregate: no grants, wildcards off.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
    pub readers: Vec<Reader>,
    pub all_readers: AllReaders,
    pub updaters: Vec<Updater>,
    pub all_updaters: AllUpdaters,
    pub deleters: Vec<Deleter>,
}

impl UserPermissions {
    /// Stored document shape, with typed identifiers.
    #[must_use]
    pub fn to_value(&self) -> Value {
        FieldValue::to_value(self)
    }
}

impl FieldValue for UserPermissions {
    fn to_value(&self) -> Value {
        Value::Document(Document::from([
            (keys::READERS.to_string(), list(&self.readers)),
            (keys::ALL_READERS.to_string(), self.all_readers.to_value()),
            (keys::UPDATERS.to_string(), list(&self.updaters)),
            (keys::ALL_UPDATERS.to_string(), self.all_updaters.to_value()),
            (keys::DELETERS.to_string(), list(&self.deleters)),
        ]))
    }
}

///
/// keys
///
/// Stored key names. Shared with the access predicate builder, which must
/// address exactly the shape `to_value` writes.
///

pub(crate) mod keys {
    pub(crate) const READERS: &str = "readers";
    pub(crate) const ALL_READERS: &str = "allReaders";
    pub(crate) const UPDATERS: &str = "updaters";
    pub(crate) const ALL_UPDATERS: &str = "allUpdaters";
    pub(crate) const DELETERS: &str = "deleters";

    pub(crate) const ACTOR: &str = "actor";
    pub(crate) const AUTHOR_ID: &str = "authorId";
    pub(crate) const AUTHOR_TYPE: &str = "authorType";
    pub(crate) const IS_PERMITTED: &str = "isPermitted";
    pub(crate) const ARE_PERMITTED: &str = "arePermitted";
    pub(crate) const FIELDS: &str = "fields";
    pub(crate) const NAME: &str = "name";
}

fn list<T: FieldValue>(items: &[T]) -> Value {
    Value::List(items.iter().map(FieldValue::to_value).collect())
}

fn scoped_grant(actor: &ActorRef, is_permitted: bool, fields: &[Field]) -> Value {
    Value::Document(Document::from([
        (keys::ACTOR.to_string(), actor.to_value()),
        (keys::IS_PERMITTED.to_string(), Value::Bool(is_permitted)),
        (keys::FIELDS.to_string(), list(fields)),
    ]))
}

fn wildcard_grant(are_permitted: bool, fields: &[Field]) -> Value {
    Value::Document(Document::from([
        (keys::ARE_PERMITTED.to_string(), Value::Bool(are_permitted)),
        (keys::FIELDS.to_string(), list(fields)),
    ]))
}
