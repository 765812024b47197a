use crate::{
    config::DslConfig,
    expr::{
        BoolOp, ExprError, ExpressionNode, FieldPath, FilterOp, FilterSource, Leaf, UpdateOp,
        parse_filter, parse_filter_json_str, parse_update, parse_update_json,
    },
    value::{ScalarTag, TypeTag, Value},
};
use proptest::prelude::*;
use serde_json::json;

// ---- helpers ----

fn config() -> DslConfig {
    DslConfig::default()
}

fn parse(source: &str) -> Result<ExpressionNode, ExprError> {
    parse_filter(FilterSource::Grammar(source), &config())
}

fn leaf(field: &str, op: FilterOp, value: i32) -> ExpressionNode {
    ExpressionNode::Leaf(Leaf::new(
        FieldPath::parse(field).unwrap(),
        op,
        TypeTag::scalar(ScalarTag::Int),
        Value::Int(value),
    ))
}

fn and(left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
    ExpressionNode::composite(BoolOp::And, left, right)
}

fn or(left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
    ExpressionNode::composite(BoolOp::Or, left, right)
}

///
/// STRING GRAMMAR
///

#[test]
fn conjunction_of_two_leaves() {
    assert_eq!(
        parse("Age::Gt::18::int&&Age::Lt::65::int").unwrap(),
        and(leaf("age", FilterOp::Gt, 18), leaf("age", FilterOp::Lt, 65))
    );
}

#[test]
fn leaf_then_group() {
    assert_eq!(
        parse("A::Eq::1::int||(B::Eq::2::int&&C::Eq::3::int)").unwrap(),
        or(
            leaf("a", FilterOp::Eq, 1),
            and(leaf("b", FilterOp::Eq, 2), leaf("c", FilterOp::Eq, 3))
        )
    );
}

#[test]
fn group_then_leaf() {
    assert_eq!(
        parse("(B::Eq::2::int&&C::Eq::3::int)||A::Eq::1::int").unwrap(),
        or(
            and(leaf("b", FilterOp::Eq, 2), leaf("c", FilterOp::Eq, 3)),
            leaf("a", FilterOp::Eq, 1)
        )
    );
}

#[test]
fn ungrouped_levels_split_on_the_first_operator() {
    assert_eq!(
        parse("a::Eq::1::int&&b::Eq::2::int||c::Eq::3::int").unwrap(),
        and(
            leaf("a", FilterOp::Eq, 1),
            or(leaf("b", FilterOp::Eq, 2), leaf("c", FilterOp::Eq, 3))
        )
    );
}

#[test]
fn nested_groups() {
    assert_eq!(
        parse("((a::Eq::1::int||b::Eq::2::int)&&c::Eq::3::int)||d::Eq::4::int").unwrap(),
        or(
            and(
                or(leaf("a", FilterOp::Eq, 1), leaf("b", FilterOp::Eq, 2)),
                leaf("c", FilterOp::Eq, 3)
            ),
            leaf("d", FilterOp::Eq, 4)
        )
    );
}

#[test]
fn redundant_outer_group_is_transparent() {
    assert_eq!(
        parse("(a::Eq::1::int)").unwrap(),
        leaf("a", FilterOp::Eq, 1)
    );
}

#[test]
fn typed_leaf_values() {
    let node = parse(
        "Name::Eq::john::string||(Price::Gt::100::int&&CreatedAt::Gt::2023-04-29T09:07:07.250Z::datetime)",
    )
    .unwrap();
    let leaves = node.leaves();

    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[0].value, Value::text("john"));
    assert_eq!(leaves[2].field.as_str(), "createdAt");
    assert!(matches!(leaves[2].value, Value::DateTime(_)));
}

#[test]
fn empty_string_values_are_representable() {
    let node = parse("Nickname::Eq::::string").unwrap();
    assert_eq!(node.leaves()[0].value, Value::text(""));
}

#[test]
fn whitespace_around_tokens_is_ignored() {
    assert_eq!(
        parse(" ( a::Eq::1::int ) && b::Eq::2::int ").unwrap(),
        and(leaf("a", FilterOp::Eq, 1), leaf("b", FilterOp::Eq, 2))
    );
}

///
/// STRING GRAMMAR ERRORS
///

#[test]
fn unbalanced_parentheses_fail_before_anything_else() {
    for source in ["(a::Eq::1::int", "a::Eq::1::int)", "((", "bogus)"] {
        assert!(
            matches!(parse(source), Err(ExprError::UnbalancedParentheses { .. })),
            "{source}"
        );
    }
}

#[test]
fn balanced_but_misordered_parentheses_fail() {
    assert!(matches!(
        parse(")a::Eq::1::int("),
        Err(ExprError::UnexpectedClose { offset: 0 })
    ));
}

#[test]
fn wrong_leaf_arity_is_located() {
    let err = parse("a::Eq::1::int&&b::Eq::2").unwrap_err();

    assert_eq!(
        err,
        ExprError::LeafArity {
            offset: 15,
            clause: "b::Eq::2".to_string(),
            parts: 3,
        }
    );
}

#[test]
fn unknown_operation_is_rejected() {
    assert!(matches!(
        parse("a::Like::x::string"),
        Err(ExprError::UnknownOperation { operation, .. }) if operation == "Like"
    ));
}

#[test]
fn update_operations_are_not_filter_operations() {
    assert!(matches!(
        parse("a::Set::x::string"),
        Err(ExprError::UnknownOperation { .. })
    ));
}

#[test]
fn unknown_type_is_rejected() {
    assert!(matches!(
        parse("a::Eq::x::text"),
        Err(ExprError::Coercion { .. })
    ));
}

#[test]
fn coercion_failure_aborts_the_parse() {
    assert!(matches!(
        parse("a::Eq::1::int&&b::Eq::many::int"),
        Err(ExprError::Coercion { offset: 15, .. })
    ));
}

#[test]
fn structural_errors() {
    assert!(matches!(parse(""), Err(ExprError::Empty)));
    assert!(matches!(parse("()"), Err(ExprError::EmptyGroup { offset: 0 })));
    assert!(matches!(
        parse("&&a::Eq::1::int"),
        Err(ExprError::DanglingOperator { offset: 0 })
    ));
    assert!(matches!(
        parse("a::Eq::1::int||"),
        Err(ExprError::DanglingOperator { offset: 13 })
    ));
    assert!(matches!(
        parse("(a::Eq::1::int)(b::Eq::2::int)"),
        Err(ExprError::MissingOperator { offset: 15 })
    ));
    assert!(matches!(
        parse("a::Eq::1::int&&&&b::Eq::1::int"),
        Err(ExprError::DanglingOperator { .. })
    ));
}

#[test]
fn mixed_operators_next_to_a_group_are_ambiguous() {
    assert!(matches!(
        parse("a::Eq::1::int&&b::Eq::2::int||(c::Eq::3::int)"),
        Err(ExprError::MixedOperators { offset: 28 })
    ));
}

#[test]
fn repeated_operator_next_to_groups_folds_right() {
    assert_eq!(
        parse("(a::Eq::1::int)&&(b::Eq::2::int)&&c::Eq::3::int").unwrap(),
        and(
            leaf("a", FilterOp::Eq, 1),
            and(leaf("b", FilterOp::Eq, 2), leaf("c", FilterOp::Eq, 3))
        )
    );
}

#[test]
fn a_level_of_bare_groups_holds_at_most_two() {
    assert_eq!(
        parse("(a::Eq::1::int)||(b::Eq::2::int)").unwrap(),
        or(leaf("a", FilterOp::Eq, 1), leaf("b", FilterOp::Eq, 2))
    );
    assert!(matches!(
        parse("(a::Eq::1::int)&&(b::Eq::2::int)&&(c::Eq::3::int)"),
        Err(ExprError::TooManyGroups {
            offset: 32,
            groups: 3
        })
    ));
    assert!(matches!(
        parse("((a::Eq::1::int)||(b::Eq::2::int)||(c::Eq::3::int))"),
        Err(ExprError::TooManyGroups { .. })
    ));
}

#[test]
fn nesting_depth_is_bounded() {
    let config = DslConfig {
        max_depth: 2,
        ..DslConfig::default()
    };

    assert!(parse_filter(FilterSource::Grammar("((a::Eq::1::int))"), &config).is_ok());
    assert!(matches!(
        parse_filter(FilterSource::Grammar("(((a::Eq::1::int)))"), &config),
        Err(ExprError::TooDeep { offset: 2, max: 2 })
    ));
}

#[test]
fn source_length_is_bounded() {
    let config = DslConfig {
        max_source_len: 8,
        ..DslConfig::default()
    };

    assert!(matches!(
        parse_filter(FilterSource::Grammar("a::Eq::1::int"), &config),
        Err(ExprError::TooLong { len: 13, max: 8 })
    ));
}

#[test]
fn invalid_field_names_are_malformed() {
    assert!(matches!(
        parse("na$me::Eq::1::int"),
        Err(ExprError::InvalidField { .. })
    ));
}

///
/// JSON TREE
///

#[test]
fn json_and_string_codecs_agree() {
    let tree = json!({
        "operation": "||",
        "filters": [
            { "field": "A", "operation": "Eq", "type": "int", "value": 1 },
            {
                "operation": "&&",
                "filters": [
                    { "field": "B", "operation": "Eq", "type": "int", "value": "2" },
                    { "field": "C", "operation": "Eq", "type": "int", "value": 3 }
                ]
            }
        ]
    });

    assert_eq!(
        parse_filter(FilterSource::Tree(&tree), &config()).unwrap(),
        parse("A::Eq::1::int||(B::Eq::2::int&&C::Eq::3::int)").unwrap()
    );
}

#[test]
fn json_groups_fold_right_and_collapse() {
    let tree = json!({
        "operation": "&&",
        "filters": [
            { "field": "a", "operation": "Eq", "type": "int", "value": 1 },
            { "field": "b", "operation": "Eq", "type": "int", "value": 2 },
            { "operation": "||", "filters": [
                { "field": "c", "operation": "Eq", "type": "int", "value": 3 }
            ] }
        ]
    });

    assert_eq!(
        parse_filter(FilterSource::Tree(&tree), &config()).unwrap(),
        parse("a::Eq::1::int&&b::Eq::2::int&&c::Eq::3::int").unwrap()
    );
}

#[test]
fn json_array_values_become_array_literals() {
    let tree = json!({ "field": "roles", "operation": "In", "type": "string_array", "value": ["admin", "ops"] });

    assert_eq!(
        parse_filter(FilterSource::Tree(&tree), &config()).unwrap(),
        parse("roles::In::admin,ops::string_array").unwrap()
    );
}

#[test]
fn json_array_elements_are_never_split() {
    let tree = json!({ "field": "tags", "operation": "In", "type": "string_array", "value": ["a,b"] });
    assert!(matches!(
        parse_filter(FilterSource::Tree(&tree), &config()),
        Err(ExprError::Json { .. })
    ));

    let nested = json!({ "field": "tags", "operation": "In", "type": "string_array", "value": [["a"]] });
    assert!(matches!(
        parse_filter(FilterSource::Tree(&nested), &config()),
        Err(ExprError::Json { .. })
    ));
}

#[test]
fn json_errors() {
    let cases = [
        json!({ "operation": "&&", "filters": [] }),
        json!({ "operation": "and", "filters": [{ "field": "a", "operation": "Eq", "type": "int", "value": 1 }] }),
        json!({ "field": "a", "operation": "Eq", "type": "int", "value": 1, "extra": true }),
        json!({ "field": "a", "operation": "Eq", "value": 1 }),
        json!({ "field": "a", "operation": "Eq", "type": "int", "value": "x" }),
        json!([1, 2]),
    ];

    for case in &cases {
        assert!(
            parse_filter(FilterSource::Tree(case), &config()).is_err(),
            "{case}"
        );
    }

    assert!(matches!(
        parse_filter_json_str("{not json", &config()),
        Err(ExprError::Json { .. })
    ));
}

///
/// ENCODING
///

#[test]
fn encoding_groups_every_composite_operand() {
    let tree = and(
        or(leaf("a", FilterOp::Eq, 1), leaf("b", FilterOp::Eq, 2)),
        and(
            or(leaf("c", FilterOp::Eq, 3), leaf("d", FilterOp::Eq, 4)),
            or(leaf("e", FilterOp::Eq, 5), leaf("f", FilterOp::Eq, 6)),
        ),
    );
    let encoded = tree.encode().unwrap();

    assert_eq!(
        encoded,
        "(a::Eq::1::int||b::Eq::2::int)&&((c::Eq::3::int||d::Eq::4::int)&&(e::Eq::5::int||f::Eq::6::int))"
    );
    assert_eq!(parse(&encoded).unwrap(), tree);
}

#[test]
fn literals_holding_grammar_tokens_cannot_be_encoded() {
    let text = |raw: &str| {
        ExpressionNode::Leaf(Leaf::new(
            FieldPath::parse("name").unwrap(),
            FilterOp::Eq,
            TypeTag::scalar(ScalarTag::String),
            Value::text(raw),
        ))
    };

    for raw in ["a&&b", "a||b", "(a", "a)", "a::b", "a:"] {
        assert!(
            matches!(text(raw).encode(), Err(ExprError::Unencodable { .. })),
            "{raw}"
        );
    }
    assert_eq!(text("a:b").encode().unwrap(), "name::Eq::a:b::string");

    let split = ExpressionNode::Leaf(Leaf::new(
        FieldPath::parse("tags").unwrap(),
        FilterOp::In,
        TypeTag::array(ScalarTag::String),
        Value::List(vec![Value::text("a,b")]),
    ));
    assert!(matches!(split.encode(), Err(ExprError::Unencodable { .. })));

    let list = parse_update_json(&json!([
        { "field": "note", "operation": "Set", "type": "string", "value": "x|||y" }
    ]))
    .unwrap();
    assert!(matches!(list.encode("|||"), Err(ExprError::Unencodable { .. })));
    assert!(list.encode(";").is_ok());
}

///
/// UPDATE LISTS
///

#[test]
fn update_leaves_split_on_the_apply_all_separator() {
    let list = parse_update("Status::Set::Active::string|||Retries::Inc::1::int", &config()).unwrap();
    let leaves = list.leaves();

    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].operation, UpdateOp::Set);
    assert_eq!(leaves[0].value, Value::text("Active"));
    assert_eq!(leaves[1].field.as_str(), "retries");
    assert_eq!(leaves[1].value, Value::Int(1));
}

#[test]
fn update_separator_is_configurable() {
    let config = DslConfig {
        apply_all_separator: ";".to_string(),
        ..DslConfig::default()
    };

    let list = parse_update("a::Set::1::int;b::Unset::::null", &config).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.encode(";").unwrap(), "a::Set::1::int;b::Unset::null::null");
}

#[test]
fn update_errors() {
    assert!(matches!(parse_update("", &config()), Err(ExprError::Empty)));
    assert!(matches!(
        parse_update("a::Set::1::int|||", &config()),
        Err(ExprError::EmptyClause { offset: 17 })
    ));
    assert!(matches!(
        parse_update("a::Eq::1::int", &config()),
        Err(ExprError::UnknownOperation { .. })
    ));
}

#[test]
fn update_fields_include_rename_targets() {
    let list = parse_update("OldName::Rename::NewName::string|||Age::Inc::1::int", &config()).unwrap();
    let fields: Vec<_> = list.fields().into_iter().map(|f| f.to_string()).collect();

    assert_eq!(fields, vec!["age", "newName", "oldName"]);
}

#[test]
fn update_json_matches_string_form() {
    let json = json!([
        { "field": "Status", "operation": "Set", "type": "string", "value": "Active" },
        { "field": "Retries", "operation": "Inc", "type": "int", "value": 1 }
    ]);

    assert_eq!(
        parse_update_json(&json).unwrap(),
        parse_update("Status::Set::Active::string|||Retries::Inc::1::int", &config()).unwrap()
    );
    assert!(matches!(parse_update_json(&json!([])), Err(ExprError::Empty)));
}

///
/// PROPERTIES
///

fn arb_leaf() -> impl Strategy<Value = ExpressionNode> {
    let field = prop_oneof![
        Just("age"),
        Just("name"),
        Just("createdAt"),
        Just("tags"),
        Just("address.city")
    ];
    let value = prop_oneof![
        (
            prop_oneof![Just(FilterOp::Eq), Just(FilterOp::Gt), Just(FilterOp::Lte)],
            any::<i32>()
        )
            .prop_map(|(op, n)| (op, TypeTag::scalar(ScalarTag::Int), Value::Int(n))),
        (
            prop_oneof![Just(FilterOp::Ne), Just(FilterOp::AnyEq), Just(FilterOp::Regex)],
            "[a-zA-Z0-9 ]{0,6}"
        )
            .prop_map(|(op, s)| {
                let s = s.trim().to_string();
                (op, TypeTag::scalar(ScalarTag::String), Value::Text(s))
            }),
        any::<bool>().prop_map(|b| (
            FilterOp::Exists,
            TypeTag::scalar(ScalarTag::Bool),
            Value::Bool(b)
        )),
        prop::collection::vec(any::<i64>(), 0..4).prop_map(|xs| (
            FilterOp::In,
            TypeTag::array(ScalarTag::Long),
            Value::List(xs.into_iter().map(Value::Long).collect())
        )),
    ];

    (field, value).prop_map(|(field, (op, ty, value))| {
        ExpressionNode::Leaf(Leaf::new(FieldPath::parse(field).unwrap(), op, ty, value))
    })
}

fn arb_tree() -> impl Strategy<Value = ExpressionNode> {
    arb_leaf().prop_recursive(5, 32, 2, |inner| {
        (
            prop_oneof![Just(BoolOp::And), Just(BoolOp::Or)],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, l, r)| ExpressionNode::composite(op, l, r))
    })
}

proptest! {
    #[test]
    fn string_encoding_round_trips(tree in arb_tree()) {
        let encoded = tree.encode().unwrap();
        prop_assert_eq!(parse(&encoded).unwrap(), tree);
    }

    #[test]
    fn json_encoding_round_trips(tree in arb_tree()) {
        let encoded = tree.to_json();
        prop_assert_eq!(parse_filter(FilterSource::Tree(&encoded), &config()).unwrap(), tree);
    }

    #[test]
    fn both_codecs_build_the_same_tree(tree in arb_tree()) {
        let from_string = parse(&tree.encode().unwrap()).unwrap();
        let from_json = parse_filter(FilterSource::Tree(&tree.to_json()), &config()).unwrap();
        prop_assert_eq!(from_string, from_json);
    }

    #[test]
    fn unbalanced_sources_are_always_malformed(prefix in "[a-z:()&|]{0,12}", extra in 1usize..3) {
        let source = format!("{prefix}{}", "(".repeat(extra));
        let open = source.matches('(').count();
        let close = source.matches(')').count();
        prop_assume!(open != close);
        prop_assert!(
            matches!(parse(&source), Err(ExprError::UnbalancedParentheses { .. })),
            "unbalanced source should be rejected"
        );
    }
}
