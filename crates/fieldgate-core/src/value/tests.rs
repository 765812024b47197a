use crate::{
    types::{Float64, ObjectId},
    value::{CoercionError, ScalarTag, TypeTag, Value, coerce, compare_eq, compare_order},
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::{cmp::Ordering, str::FromStr};

// ---- helpers ----

fn tag(raw: &str) -> TypeTag {
    raw.parse().expect("known type tag")
}

fn double(v: f64) -> Value {
    Value::Double(Float64::try_new(v).expect("finite"))
}

///
/// TYPE TAGS
///

#[test]
fn every_tag_round_trips_through_its_label() {
    for t in TypeTag::all() {
        assert_eq!(t.to_string().parse::<TypeTag>(), Ok(t));
    }
    assert_eq!(TypeTag::all().count(), 20);
}

#[test]
fn unknown_tags_are_rejected_not_defaulted() {
    for raw in ["", "str", "String", "int_arr", "_array", "array", "objectid"] {
        assert!(
            matches!(raw.parse::<TypeTag>(), Err(CoercionError::UnknownType { .. })),
            "{raw} should be unknown"
        );
    }
}

#[test]
fn array_suffix_marks_array_tags() {
    assert_eq!(tag("int_array"), TypeTag::array(ScalarTag::Int));
    assert_eq!(tag("objectId"), TypeTag::scalar(ScalarTag::ObjectId));
}

///
/// COERCION
///

#[test]
fn scalar_literals_coerce_into_their_variants() {
    assert_eq!(coerce("john", tag("string")), Ok(Value::text("john")));
    assert_eq!(coerce("100", tag("int")), Ok(Value::Int(100)));
    assert_eq!(coerce("9000000000", tag("long")), Ok(Value::Long(9_000_000_000)));
    assert_eq!(coerce("2.5", tag("double")), Ok(double(2.5)));
    assert_eq!(coerce("0.5", tag("float")), Ok(double(0.5)));
    assert_eq!(
        coerce("12.50", tag("decimal")),
        Ok(Value::Decimal(Decimal::from_str("12.50").unwrap()))
    );
    assert_eq!(coerce("TRUE", tag("bool")), Ok(Value::Bool(true)));
    assert_eq!(coerce("false", tag("bool")), Ok(Value::Bool(false)));
    assert_eq!(coerce("", tag("null")), Ok(Value::Null));
    assert_eq!(coerce("null", tag("null")), Ok(Value::Null));
}

#[test]
fn datetime_literals_are_normalized_to_utc() {
    let expected = Utc.with_ymd_and_hms(2023, 4, 29, 9, 7, 7).unwrap()
        + chrono::Duration::milliseconds(250);

    assert_eq!(
        coerce("2023-04-29T09:07:07.250Z", tag("datetime")),
        Ok(Value::DateTime(expected))
    );
    assert_eq!(
        coerce("2023-04-29T11:07:07.250+02:00", tag("datetime")),
        Ok(Value::DateTime(expected))
    );
}

#[test]
fn empty_string_literal_is_representable() {
    assert_eq!(coerce("", tag("string")), Ok(Value::text("")));
}

#[test]
fn array_literals_coerce_each_element() {
    assert_eq!(
        coerce("1,2,3", tag("int_array")),
        Ok(Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
    assert_eq!(coerce("", tag("string_array")), Ok(Value::List(vec![])));
}

#[test]
fn array_coercion_reports_the_offending_element() {
    let err = coerce("1,x,3", tag("int_array")).unwrap_err();

    match err {
        CoercionError::InvalidLiteral { literal, tag: t, .. } => {
            assert_eq!(literal, "x");
            assert_eq!(t, TypeTag::array(ScalarTag::Int));
        }
        other @ CoercionError::UnknownType { .. } => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unparsable_literals_are_reported() {
    for (raw, t) in [
        ("abc", "int"),
        ("3000000000", "int"),
        ("yes", "bool"),
        ("2023-13-40", "datetime"),
        ("xyz", "objectId"),
        ("NaN", "double"),
        ("inf", "float"),
        ("nothing", "null"),
    ] {
        assert!(
            matches!(coerce(raw, tag(t)), Err(CoercionError::InvalidLiteral { .. })),
            "{raw} as {t} should fail"
        );
    }
}

#[test]
fn literals_re_encode_to_the_same_value() {
    let values = [
        Value::text("a b"),
        Value::Int(-4),
        Value::Long(1 << 40),
        double(3.25),
        Value::Bool(true),
        Value::Null,
        Value::ObjectId(ObjectId::from_bytes([7; 12])),
        Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()),
    ];
    let tags = [
        "string", "int", "long", "double", "bool", "null", "objectId", "datetime",
    ];

    for (value, t) in values.iter().zip(tags) {
        assert_eq!(coerce(&value.to_literal(), tag(t)).as_ref(), Ok(value));
    }
}

///
/// COMPARISON
///

#[test]
fn numeric_comparison_widens_across_variants() {
    assert!(compare_eq(&Value::Int(100), &Value::Long(100)));
    assert!(compare_eq(&Value::Int(1), &double(1.0)));
    assert_eq!(
        compare_order(&Value::Long(5), &Value::Decimal(Decimal::new(45, 1))),
        Some(Ordering::Greater)
    );
}

#[test]
fn mixed_kinds_have_no_order_and_are_unequal() {
    assert_eq!(compare_order(&Value::text("1"), &Value::Int(1)), None);
    assert!(!compare_eq(&Value::text("1"), &Value::Int(1)));
    assert_eq!(compare_order(&Value::Null, &Value::Null), None);
}

#[test]
fn lists_compare_element_wise() {
    let a = Value::List(vec![Value::Int(1), Value::text("x")]);
    let b = Value::List(vec![Value::Long(1), Value::text("x")]);

    assert!(compare_eq(&a, &b));
}

///
/// EXTENDED JSON
///

#[test]
fn typed_scalars_render_as_extended_json() {
    let id = ObjectId::from_bytes([0xab; 12]);

    assert_eq!(
        Value::ObjectId(id).to_extended_json(),
        json!({ "$oid": "abababababababababababab" })
    );
    assert_eq!(
        Value::Long(7).to_extended_json(),
        json!({ "$numberLong": "7" })
    );
    assert_eq!(
        Value::DateTime(Utc.with_ymd_and_hms(2023, 4, 29, 9, 7, 7).unwrap()).to_extended_json(),
        json!({ "$date": "2023-04-29T09:07:07.000Z" })
    );
    assert_eq!(Value::Int(7).to_extended_json(), json!(7));
}

#[test]
fn plain_json_loads_as_documents() {
    let value = Value::from_json(&json!({ "name": "ann", "age": 30, "tags": ["a"], "big": 5_000_000_000_i64 }));

    assert_eq!(value.lookup("name"), Some(&Value::text("ann")));
    assert_eq!(value.lookup("age"), Some(&Value::Int(30)));
    assert_eq!(value.lookup("big"), Some(&Value::Long(5_000_000_000)));
    assert_eq!(
        value.lookup("tags"),
        Some(&Value::List(vec![Value::text("a")]))
    );
}
