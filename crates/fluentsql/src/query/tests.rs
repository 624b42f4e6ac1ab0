use super::*;
use crate::alias::TableKey;

fn render(query: &Query) -> (Option<String>, Vec<Value>) {
    let mut session = BuildSession::new();
    session.aliases_mut().add(TableKey::named("saas_tenant"), Some("t"));
    session.aliases_mut().add(TableKey::named("saas_order"), Some("o"));
    let sql = query.render(&mut session).unwrap();
    (sql, session.take_params())
}

#[test]
fn enable_and_order_type_in() {
    let query = where_("t.enable").eq(true).and("o.order_type").in_([1, 2, 3]);
    let (sql, params) = render(&query);
    assert_eq!(
        sql.as_deref(),
        Some("t.`enable` = ? AND o.`order_type` IN (?, ?, ?)")
    );
    assert_eq!(
        params,
        vec![Value::Bool(true), Value::Int(1), Value::Int(2), Value::Int(3)]
    );
    assert_eq!(query.parameters(), Some(params));
}

#[test]
fn empty_query_renders_nothing() {
    let query = Query::new();
    assert!(query.is_empty());
    assert_eq!(query.parameters(), None);
    assert_eq!(render(&query), (None, vec![]));
}

#[test]
fn query_of_only_empty_conditions_is_empty() {
    let query = where_("t.name")
        .like("")
        .or("t.remark")
        .eq(None::<String>)
        .and("t.created")
        .between(Value::Null, "2024-01-01");
    assert!(query.is_empty());
    assert_eq!(render(&query), (None, vec![]));
}

#[test]
fn no_leading_conjunction_after_skipped_member() {
    let query = where_("t.name").eq("").or("t.id").eq(1);
    let (sql, _) = render(&query);
    assert_eq!(sql.as_deref(), Some("t.`id` = ?"));
    assert_eq!(query.len(), 1);
}

#[test]
fn like_variants() {
    let query = where_("t.name")
        .like("ac")
        .and("t.code")
        .like_left("A")
        .and("t.code")
        .like_right("Z");
    let (sql, params) = render(&query);
    assert_eq!(
        sql.as_deref(),
        Some(
            "t.`name` LIKE CONCAT('%', ?, '%') AND t.`code` LIKE CONCAT(?, '%') \
             AND t.`code` LIKE CONCAT('%', ?)"
        )
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn comparison_operators() {
    let query = where_("t.a")
        .ne(1)
        .and("t.b")
        .gt(2)
        .and("t.c")
        .gte(3)
        .and("t.d")
        .lt(4)
        .and("t.e")
        .lte(5)
        .and("t.f")
        .between(6, 7);
    let (sql, params) = render(&query);
    assert_eq!(
        sql.as_deref(),
        Some(
            "t.`a` != ? AND t.`b` > ? AND t.`c` >= ? AND t.`d` < ? AND t.`e` <= ? \
             AND t.`f` BETWEEN ? AND ?"
        )
    );
    assert_eq!(params, (1..=7).map(Value::Int).collect::<Vec<_>>());
}

#[test]
fn null_checks_bind_nothing() {
    let query = where_("t.remark").is_null().or("t.name").not_null();
    let (sql, params) = render(&query);
    assert_eq!(sql.as_deref(), Some("t.`remark` IS NULL OR t.`name` IS NOT NULL"));
    assert!(params.is_empty());
    assert_eq!(query.parameters(), Some(vec![]));
}

#[test]
fn empty_in_list_renders_constant_predicate() {
    let query = where_("t.id")
        .in_(Vec::<i64>::new())
        .and("o.id")
        .not_in(Vec::<i64>::new());
    let (sql, params) = render(&query);
    assert_eq!(sql.as_deref(), Some("1 = 0 AND 1 = 1"));
    assert!(params.is_empty());
}

#[test]
fn absent_in_list_is_skipped() {
    let query = where_("t.id")
        .in_opt(None::<Vec<i64>>)
        .and("o.id")
        .not_in_opt(Some([4, 5]));
    let (sql, params) = render(&query);
    assert_eq!(sql.as_deref(), Some("o.`id` NOT IN (?, ?)"));
    assert_eq!(params, vec![Value::Int(4), Value::Int(5)]);
}

#[test]
fn column_to_column_binds_nothing() {
    let query = where_("t.id").eq_field("o.tenant_id");
    let (sql, params) = render(&query);
    assert_eq!(sql.as_deref(), Some("t.`id` = o.`tenant_id`"));
    assert!(params.is_empty());
}

#[test]
fn single_member_subquery_is_not_parenthesized() {
    let query = where_("t.a").eq(1).or_query(where_("t.b").eq(2));
    let (sql, _) = render(&query);
    assert_eq!(sql.as_deref(), Some("t.`a` = ? OR t.`b` = ?"));
}

#[test]
fn empty_subquery_is_ignored() {
    let query = where_("t.a")
        .eq(1)
        .and_query(Query::new())
        .or_query(where_("t.b").eq(""));
    let (sql, _) = render(&query);
    assert_eq!(sql.as_deref(), Some("t.`a` = ?"));
    assert_eq!(query.len(), 1);
}

#[test]
fn deep_nesting_keeps_parameter_order() {
    let inner = where_("o.x").eq(2).or("o.y").eq(3);
    let middle = where_("t.b").eq(1).and_query(inner);
    let query = where_("t.a")
        .eq(0)
        .or_query(middle)
        .and("t.c")
        .in_([4, 5]);
    let (sql, params) = render(&query);
    assert_eq!(
        sql.as_deref(),
        Some("t.`a` = ? OR (t.`b` = ? AND (o.`x` = ? OR o.`y` = ?)) AND t.`c` IN (?, ?)")
    );
    assert_eq!(params, (0..=5).map(Value::Int).collect::<Vec<_>>());
    assert_eq!(query.parameters(), Some(params));
}

#[test]
fn completed_conditions_can_be_appended() {
    let status = Condition::new("o.status", Operator::Eq, Value::from(3));
    let skipped = Condition::new("o.note", Operator::Like, Value::from(""));
    let query = Query::new()
        .and_condition(skipped)
        .or_condition(status);
    let (sql, params) = render(&query);
    assert_eq!(sql.as_deref(), Some("o.`status` = ?"));
    assert_eq!(params, vec![Value::Int(3)]);
}

#[test]
fn rendering_is_repeatable() {
    let query = where_("t.a").eq(1).and("t.b").in_(["x", "y"]);
    assert_eq!(render(&query), render(&query));
}
