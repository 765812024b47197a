use crate::obs::DslKind;
use std::fmt;

///
/// OperationVocabulary
///
/// Closed set of operation tokens for one DSL. Parsing is exact: a token
/// outside `ALL` is an error, never ignored.
///

pub trait OperationVocabulary: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];
    const DSL: DslKind;

    fn label(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.label() == raw)
    }
}

///
/// FilterOp
///
/// Any*  → element-wise comparison against an array field.
/// Size* → array cardinality comparison.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FilterOp {
    All,
    In,
    Regex,
    Exists,
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    AnyEq,
    AnyNe,
    AnyGt,
    AnyLt,
    AnyGte,
    AnyLte,
    SizeEq,
    SizeGt,
    SizeLt,
    SizeGte,
    SizeLte,
}

impl OperationVocabulary for FilterOp {
    const ALL: &'static [Self] = &[
        Self::All,
        Self::In,
        Self::Regex,
        Self::Exists,
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::AnyEq,
        Self::AnyNe,
        Self::AnyGt,
        Self::AnyLt,
        Self::AnyGte,
        Self::AnyLte,
        Self::SizeEq,
        Self::SizeGt,
        Self::SizeLt,
        Self::SizeGte,
        Self::SizeLte,
    ];
    const DSL: DslKind = DslKind::Filter;

    fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::In => "In",
            Self::Regex => "Regex",
            Self::Exists => "Exists",
            Self::Eq => "Eq",
            Self::Ne => "Ne",
            Self::Gt => "Gt",
            Self::Lt => "Lt",
            Self::Gte => "Gte",
            Self::Lte => "Lte",
            Self::AnyEq => "AnyEq",
            Self::AnyNe => "AnyNe",
            Self::AnyGt => "AnyGt",
            Self::AnyLt => "AnyLt",
            Self::AnyGte => "AnyGte",
            Self::AnyLte => "AnyLte",
            Self::SizeEq => "SizeEq",
            Self::SizeGt => "SizeGt",
            Self::SizeLt => "SizeLt",
            Self::SizeGte => "SizeGte",
            Self::SizeLte => "SizeLte",
        }
    }
}

///
/// UpdateOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum UpdateOp {
    Inc,
    Max,
    Min,
    Mul,
    PopFirst,
    PopLast,
    Pull,
    PullAll,
    PullFilter,
    Push,
    PushEach,
    Rename,
    Set,
    Unset,
}

impl UpdateOp {
    /// Operations that take no value; their literal is ignored.
    #[must_use]
    pub const fn is_valueless(self) -> bool {
        matches!(self, Self::PopFirst | Self::PopLast | Self::Unset)
    }
}

impl OperationVocabulary for UpdateOp {
    const ALL: &'static [Self] = &[
        Self::Inc,
        Self::Max,
        Self::Min,
        Self::Mul,
        Self::PopFirst,
        Self::PopLast,
        Self::Pull,
        Self::PullAll,
        Self::PullFilter,
        Self::Push,
        Self::PushEach,
        Self::Rename,
        Self::Set,
        Self::Unset,
    ];
    const DSL: DslKind = DslKind::Update;

    fn label(self) -> &'static str {
        match self {
            Self::Inc => "Inc",
            Self::Max => "Max",
            Self::Min => "Min",
            Self::Mul => "Mul",
            Self::PopFirst => "PopFirst",
            Self::PopLast => "PopLast",
            Self::Pull => "Pull",
            Self::PullAll => "PullAll",
            Self::PullFilter => "PullFilter",
            Self::Push => "Push",
            Self::PushEach => "PushEach",
            Self::Rename => "Rename",
            Self::Set => "Set",
            Self::Unset => "Unset",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
