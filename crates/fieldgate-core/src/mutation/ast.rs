use crate::{expr::FieldPath, predicate::Predicate, types::Float64, value::Value};

///
/// Mutation
///
/// One atomic composite mutation. Operations are kept in source order and
/// never overlap: no two of them touch the same path or a path underneath
/// another one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mutation {
    pub ops: Vec<FieldMutation>,
}

impl Mutation {
    /// Every path the mutation writes, rename targets included.
    pub fn touched_paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.ops.iter().flat_map(|m| {
            let target = match &m.op {
                MutationOp::Rename(target) => Some(target),
                _ => None,
            };
            std::iter::once(&m.field).chain(target)
        })
    }
}

///
/// FieldMutation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMutation {
    pub field: FieldPath,
    pub op: MutationOp,
}

///
/// MutationOp
///
/// PullFilter → remove every element document matching the predicate;
///              predicate paths are relative to the element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MutationOp {
    Inc(Float64),
    Max(Float64),
    Min(Float64),
    Mul(Float64),
    PopFirst,
    PopLast,
    Pull(Value),
    PullAll(Vec<Value>),
    PullFilter(Predicate),
    Push(Value),
    PushEach(Vec<Value>),
    Rename(FieldPath),
    Set(Value),
    Unset,
}

impl MutationOp {
    /// Backend update operator the op is grouped under.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Inc(_) => "$inc",
            Self::Max(_) => "$max",
            Self::Min(_) => "$min",
            Self::Mul(_) => "$mul",
            Self::PopFirst | Self::PopLast => "$pop",
            Self::Pull(_) | Self::PullFilter(_) => "$pull",
            Self::PullAll(_) => "$pullAll",
            Self::Push(_) | Self::PushEach(_) => "$push",
            Self::Rename(_) => "$rename",
            Self::Set(_) => "$set",
            Self::Unset => "$unset",
        }
    }
}
