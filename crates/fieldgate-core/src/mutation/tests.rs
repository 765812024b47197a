use crate::{
    config::DslConfig,
    expr::parse_update,
    mutation::{ApplyError, Mutation, MutationOp, apply, compile_update, render},
    predicate::CompileError,
    types::Float64,
    value::{Document, Value},
};
use serde_json::json;

// ---- helpers ----

fn compile(source: &str) -> Result<Mutation, CompileError> {
    compile_update(&parse_update(source, &DslConfig::default()).unwrap(), &DslConfig::default())
}

fn doc(json: serde_json::Value) -> Document {
    match Value::from_json(&json) {
        Value::Document(doc) => doc,
        other => panic!("not a document: {other:?}"),
    }
}

fn applied(source: &str, before: serde_json::Value) -> Result<Document, ApplyError> {
    let mut d = doc(before);
    apply(&compile(source).unwrap(), &mut d)?;
    Ok(d)
}

///
/// COMPILATION
///

#[test]
fn set_and_inc_compile_into_one_mutation() {
    let m = compile("Status::Set::Active::string|||Retries::Inc::1::int").unwrap();

    assert_eq!(m.ops.len(), 2);
    assert_eq!(m.ops[0].field.as_str(), "status");
    assert_eq!(m.ops[0].op, MutationOp::Set(Value::text("Active")));
    assert_eq!(m.ops[1].op, MutationOp::Inc(Float64::from(1)));
}

#[test]
fn numeric_operations_require_numbers() {
    assert!(matches!(
        compile("Retries::Inc::one::string"),
        Err(CompileError::InvalidOperand { .. })
    ));
    assert!(matches!(
        compile("Tags::PushEach::a::string"),
        Err(CompileError::InvalidOperand { .. })
    ));
    assert!(matches!(
        compile("Name::Rename::bad name!::string"),
        Err(CompileError::InvalidOperand { .. })
    ));
}

#[test]
fn overlapping_paths_conflict() {
    for source in [
        "A::Set::1::int|||A::Inc::1::int",
        "Address::Unset::::null|||Address.City::Set::Oslo::string",
        "A::Rename::B::string|||B::Set::1::int",
    ] {
        assert!(
            matches!(compile(source), Err(CompileError::ConflictingPaths { .. })),
            "{source}"
        );
    }
}

#[test]
fn pull_filter_takes_a_json_tree() {
    let m = compile(r#"Sessions::PullFilter::{"field":"expired","operation":"Eq","type":"bool","value":true}::string"#).unwrap();
    assert!(matches!(m.ops[0].op, MutationOp::PullFilter(_)));

    assert!(matches!(
        compile("Sessions::PullFilter::not json::string"),
        Err(CompileError::PullFilter { .. })
    ));
}

#[test]
fn pull_filter_honors_the_configured_depth() {
    let source = r#"Sessions::PullFilter::{"operation":"&&","filters":[{"operation":"||","filters":[{"field":"expired","operation":"Eq","type":"bool","value":true}]}]}::string"#;
    let shallow = DslConfig {
        max_depth: 1,
        ..DslConfig::default()
    };
    let list = parse_update(source, &shallow).unwrap();

    assert!(compile_update(&list, &DslConfig::default()).is_ok());
    assert!(matches!(
        compile_update(&list, &shallow),
        Err(CompileError::PullFilter { .. })
    ));
}

///
/// RENDERING
///

#[test]
fn renders_grouped_update_document() {
    let m = compile(
        "Status::Set::Active::string|||Retries::Inc::1::int|||Tags::PushEach::a,b::string_array|||Old::Unset::::null|||Queue::PopFirst::::null",
    )
    .unwrap();

    assert_eq!(
        render(&m),
        json!({
            "$set": { "status": "Active" },
            "$inc": { "retries": 1 },
            "$push": { "tags": { "$each": ["a", "b"] } },
            "$unset": { "old": "" },
            "$pop": { "queue": -1 }
        })
    );
}

#[test]
fn fractional_operands_render_as_doubles() {
    assert_eq!(
        render(&compile("Score::Mul::1.5::double").unwrap()),
        json!({ "$mul": { "score": 1.5 } })
    );
}

#[test]
fn renders_rename_and_pull_filter() {
    let m = compile(r#"Nick::Rename::DisplayName::string|||Sessions::PullFilter::{"field":"expired","operation":"Eq","type":"bool","value":true}::string"#).unwrap();

    assert_eq!(
        render(&m),
        json!({
            "$rename": { "nick": "displayName" },
            "$pull": { "sessions": { "expired": { "$eq": true } } }
        })
    );
}

///
/// APPLY
///

#[test]
fn applies_all_operations_together() {
    let after = applied(
        "Status::Set::Active::string|||Retries::Inc::1::int",
        json!({ "status": "Pending", "retries": 2 }),
    )
    .unwrap();

    assert_eq!(after.get("status"), Some(&Value::text("Active")));
    assert_eq!(after.get("retries"), Some(&Value::Int(3)));
}

#[test]
fn failed_operation_leaves_document_untouched() {
    let mut d = doc(json!({ "status": "Pending", "retries": "two" }));
    let before = d.clone();
    let m = compile("Status::Set::Active::string|||Retries::Inc::1::int").unwrap();

    assert!(matches!(
        apply(&m, &mut d),
        Err(ApplyError::TypeMismatch { found: "string", .. })
    ));
    assert_eq!(d, before);
}

#[test]
fn integer_fields_stay_integral() {
    let after = applied("N::Inc::5::int|||M::Mul::2::int", json!({ "n": 1, "m": 3 })).unwrap();
    assert_eq!(after.get("n"), Some(&Value::Int(6)));
    assert_eq!(after.get("m"), Some(&Value::Int(6)));

    let widened = applied("N::Inc::1::int", json!({ "n": i32::MAX })).unwrap();
    assert_eq!(widened.get("n"), Some(&Value::Long(i64::from(i32::MAX) + 1)));

    let fractional = applied("N::Inc::0.5::double", json!({ "n": 1 })).unwrap();
    assert_eq!(
        fractional.get("n"),
        Some(&Value::Double(Float64::try_new(1.5).unwrap()))
    );
}

#[test]
fn min_max_and_missing_fields() {
    let after = applied(
        "Low::Min::3::int|||High::Max::3::int|||Fresh::Inc::2::int",
        json!({ "low": 5, "high": 5 }),
    )
    .unwrap();

    assert_eq!(after.get("low"), Some(&Value::Int(3)));
    assert_eq!(after.get("high"), Some(&Value::Int(5)));
    assert_eq!(after.get("fresh"), Some(&Value::Int(2)));
}

#[test]
fn array_operations() {
    let after = applied(
        "A::PopFirst::::null|||B::PopLast::::null|||C::Pull::x::string|||D::PullAll::1,2::int_array|||E::Push::z::string",
        json!({
            "a": [1, 2, 3],
            "b": [1, 2, 3],
            "c": ["x", "y", "x"],
            "d": [1, 2, 3, 2],
            "e": []
        }),
    )
    .unwrap();

    assert_eq!(after.get("a"), Some(&Value::List(vec![Value::Int(2), Value::Int(3)])));
    assert_eq!(after.get("b"), Some(&Value::List(vec![Value::Int(1), Value::Int(2)])));
    assert_eq!(after.get("c"), Some(&Value::List(vec![Value::text("y")])));
    assert_eq!(after.get("d"), Some(&Value::List(vec![Value::Int(3)])));
    assert_eq!(after.get("e"), Some(&Value::List(vec![Value::text("z")])));
}

#[test]
fn pull_filter_removes_matching_elements() {
    let after = applied(
        r#"Sessions::PullFilter::{"field":"expired","operation":"Eq","type":"bool","value":true}::string"#,
        json!({ "sessions": [{ "id": 1, "expired": true }, { "id": 2, "expired": false }] }),
    )
    .unwrap();

    let sessions = after.get("sessions").and_then(Value::as_list).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].lookup("id"), Some(&Value::Int(2)));
}

#[test]
fn rename_and_nested_set() {
    let after = applied(
        "Nick::Rename::DisplayName::string|||Address.City::Set::Oslo::string",
        json!({ "nick": "jo" }),
    )
    .unwrap();

    assert_eq!(after.get("nick"), None);
    assert_eq!(after.get("displayName"), Some(&Value::text("jo")));
    assert_eq!(
        after.get("address").and_then(|a| a.lookup("city")),
        Some(&Value::text("Oslo"))
    );
}

#[test]
fn set_through_a_scalar_is_rejected() {
    assert!(matches!(
        applied("Address.City::Set::Oslo::string", json!({ "address": "none" })),
        Err(ApplyError::NotTraversable { .. })
    ));
}
