#![allow(dead_code)]

use fluentsql::{
    Entity, FromRow, Row, Value, find_entity, metadata, registered_entities, select, where_,
};

#[derive(Debug, PartialEq, Entity, FromRow)]
#[fluent(table = "saas_tenant")]
struct Tenant {
    id: i64,
    #[fluent(column = "tenant_name")]
    name: String,
    enable: bool,
    remark: Option<String>,
    #[fluent(skip)]
    label: String,
}

#[derive(Debug, Entity, FromRow)]
struct SaasOrder {
    id: i64,
    tenant_id: i64,
    r#type: i32,
}

#[test]
fn descriptor_carries_table_and_fields() {
    let d = Tenant::DESCRIPTOR;
    assert_eq!(d.name, "Tenant");
    assert_eq!(d.table, Some("saas_tenant"));
    assert!(d.type_path.ends_with("::Tenant"));

    let properties: Vec<_> = d.fields.iter().map(|f| f.property).collect();
    assert_eq!(properties, ["id", "name", "enable", "remark"]);
    assert_eq!(d.field("name").and_then(|f| f.column), Some("tenant_name"));
    assert!(d.field("label").is_none());
}

#[test]
fn field_constants_point_at_their_entity() {
    assert_eq!(Tenant::ID.property(), "id");
    assert_eq!(Tenant::NAME.entity().type_path, Tenant::DESCRIPTOR.type_path);
    assert_eq!(SaasOrder::TENANT_ID.property(), "tenant_id");
    assert_eq!(SaasOrder::TYPE.property(), "type");
    assert_ne!(Tenant::ID, SaasOrder::ID);
}

#[test]
fn default_names_are_snake_case() {
    let meta = metadata(SaasOrder::DESCRIPTOR).unwrap();
    assert_eq!(meta.table(), "saas_order");
    assert_eq!(meta.column("tenant_id").unwrap(), "tenant_id");

    let meta = metadata(Tenant::DESCRIPTOR).unwrap();
    assert_eq!(meta.table(), "saas_tenant");
    assert_eq!(meta.column("name").unwrap(), "tenant_name");
    assert!(meta.column("label").unwrap_err().is_resolution());
}

#[test]
fn entities_are_registered() {
    let names: Vec<_> = registered_entities().map(|d| d.name).collect();
    assert!(names.contains(&"Tenant"));
    assert!(names.contains(&"SaasOrder"));

    assert_eq!(
        find_entity("saas_tenant").map(|d| d.type_path),
        Some(Tenant::DESCRIPTOR.type_path)
    );
    assert!(fluentsql::warm_up().unwrap() >= 2);
}

#[test]
fn overridden_column_renders_with_property_alias() {
    let bound = select([Tenant::ID, Tenant::NAME])
        .from::<Tenant>()
        .matching(where_(Tenant::NAME).eq("acme"))
        .build()
        .unwrap();
    assert_eq!(
        bound.sql(),
        "SELECT t1.`id` AS `id`, t1.`tenant_name` AS `name` FROM `saas_tenant` `t1` \
         WHERE t1.`tenant_name` = ?"
    );
}

#[test]
fn from_row_reads_property_then_column_labels() {
    let by_property = Row::from_pairs([
        ("id", Value::from(1i64)),
        ("name", Value::from("acme")),
        ("enable", Value::from(true)),
        ("remark", Value::Null),
    ]);
    let by_column = Row::from_pairs([
        ("id", Value::from(1i64)),
        ("tenant_name", Value::from("acme")),
        ("enable", Value::from(true)),
    ]);

    let expected = Tenant {
        id: 1,
        name: "acme".into(),
        enable: true,
        remark: None,
        label: String::new(),
    };
    assert_eq!(Tenant::from_row(&by_property).unwrap(), expected);
    assert_eq!(Tenant::from_row(&by_column).unwrap(), expected);
}

#[test]
fn from_row_reports_missing_required_column() {
    let row = Row::from_pairs([("id", 1i64)]);
    let err = Tenant::from_row(&row).unwrap_err();
    assert!(matches!(err, fluentsql::FluentError::Decode { .. }));
}

#[test]
fn from_row_narrows_integers() {
    let row = Row::from_pairs([
        ("id", Value::BigInt(3)),
        ("tenant_id", Value::Int(9)),
        ("type", Value::SmallInt(2)),
    ]);
    let order = SaasOrder::from_row(&row).unwrap();
    assert_eq!((order.id, order.tenant_id, order.r#type), (3, 9, 2));
}
