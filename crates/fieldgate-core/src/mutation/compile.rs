use crate::{
    config::DslConfig,
    expr::{FieldPath, Leaf, UpdateList, UpdateOp, decode_filter_json},
    mutation::{FieldMutation, Mutation, MutationOp},
    obs::{
        DslKind, RejectStage,
        sink::{MetricsEvent, record},
    },
    predicate::{CompileError, Predicate, compile_filter},
    types::Float64,
    value::Value,
};

/// Compile an update list into one atomic mutation.
///
/// Leaves map one-to-one onto operations, in source order. Two operations
/// whose paths coincide or nest are rejected as conflicting. `config` bounds
/// the filter trees nested in `PullFilter` operands.
pub fn compile_update(list: &UpdateList, config: &DslConfig) -> Result<Mutation, CompileError> {
    let result = compile_list(list, config);
    if result.is_err() {
        record(MetricsEvent::ExpressionRejected {
            dsl: DslKind::Update,
            stage: RejectStage::Compile,
        });
    }

    result
}

fn compile_list(list: &UpdateList, config: &DslConfig) -> Result<Mutation, CompileError> {
    let ops = list
        .leaves()
        .iter()
        .map(|leaf| compile_leaf(leaf, config))
        .collect::<Result<Vec<_>, _>>()?;
    let mutation = Mutation { ops };

    check_conflicts(&mutation)?;

    Ok(mutation)
}

fn compile_leaf(leaf: &Leaf<UpdateOp>, config: &DslConfig) -> Result<FieldMutation, CompileError> {
    let op = match leaf.operation {
        UpdateOp::Inc => MutationOp::Inc(number(leaf)?),
        UpdateOp::Max => MutationOp::Max(number(leaf)?),
        UpdateOp::Min => MutationOp::Min(number(leaf)?),
        UpdateOp::Mul => MutationOp::Mul(number(leaf)?),

        UpdateOp::PopFirst => MutationOp::PopFirst,
        UpdateOp::PopLast => MutationOp::PopLast,
        UpdateOp::Unset => MutationOp::Unset,

        UpdateOp::Pull => {
            if !leaf.value.is_scalar() {
                return Err(CompileError::operand(leaf, "a scalar value"));
            }
            MutationOp::Pull(leaf.value.clone())
        }
        UpdateOp::PullAll => MutationOp::PullAll(list(leaf)?),
        UpdateOp::PullFilter => MutationOp::PullFilter(pull_filter(leaf, config)?),
        UpdateOp::Push => MutationOp::Push(leaf.value.clone()),
        UpdateOp::PushEach => MutationOp::PushEach(list(leaf)?),

        UpdateOp::Rename => {
            let target = leaf
                .value
                .as_text()
                .and_then(|raw| FieldPath::parse(raw).ok())
                .ok_or_else(|| CompileError::operand(leaf, "a field path"))?;
            MutationOp::Rename(target)
        }
        UpdateOp::Set => MutationOp::Set(leaf.value.clone()),
    };

    Ok(FieldMutation {
        field: leaf.field.clone(),
        op,
    })
}

fn number(leaf: &Leaf<UpdateOp>) -> Result<Float64, CompileError> {
    if !leaf.value.is_numeric() {
        return Err(CompileError::operand(leaf, "a number"));
    }

    leaf.value
        .as_f64()
        .and_then(Float64::try_new)
        .ok_or_else(|| CompileError::operand(leaf, "a finite number"))
}

fn list(leaf: &Leaf<UpdateOp>) -> Result<Vec<Value>, CompileError> {
    leaf.value
        .as_list()
        .map(<[Value]>::to_vec)
        .ok_or_else(|| CompileError::operand(leaf, "an array type"))
}

// The literal is a JSON filter tree over the element documents.
fn pull_filter(leaf: &Leaf<UpdateOp>, config: &DslConfig) -> Result<Predicate, CompileError> {
    let source = leaf
        .value
        .as_text()
        .ok_or_else(|| CompileError::operand(leaf, "a JSON filter tree"))?;
    let pull_error = |message: String| CompileError::PullFilter {
        field: leaf.field.to_string(),
        message,
    };

    let node = decode_filter_json(source, config).map_err(|e| pull_error(e.to_string()))?;
    compile_filter(&node).map_err(|e| pull_error(e.to_string()))
}

fn check_conflicts(mutation: &Mutation) -> Result<(), CompileError> {
    let paths: Vec<&FieldPath> = mutation.touched_paths().collect();

    for (i, first) in paths.iter().enumerate() {
        for second in &paths[i + 1..] {
            if first.starts_with(second) || second.starts_with(first) {
                return Err(CompileError::ConflictingPaths {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }

    Ok(())
}
