//! Chains run against a recording in-memory executor.

#![allow(dead_code)]

use async_trait::async_trait;
use fluentsql::{
    DataPage, Entity, FluentError, FluentResult, FromRow, Row, SqlExecutor, Value, desc, select,
    select_all, update, where_,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Entity, FromRow)]
#[fluent(table = "saas_tenant")]
struct Tenant {
    id: i64,
    name: String,
    enable: bool,
    remark: Option<String>,
}

#[derive(Debug, Entity)]
struct SaasOrder {
    id: i64,
    tenant_id: i64,
    amount: i64,
}

/// Records every statement and answers queries from a queue.
#[derive(Default)]
struct MockExecutor {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<FluentResult<Vec<Row>>>>,
    affected: u64,
}

impl MockExecutor {
    fn returning(results: impl IntoIterator<Item = Vec<Row>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    fn failing(err: FluentError) -> Self {
        Self {
            results: Mutex::new(VecDeque::from([Err(err)])),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> FluentResult<Vec<Row>> {
        self.record(sql, params);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> FluentResult<u64> {
        self.record(sql, params);
        Ok(self.affected)
    }
}

fn tenant_row(id: i64, name: &str) -> Row {
    Row::from_pairs([
        ("id", Value::from(id)),
        ("name", Value::from(name)),
        ("enable", Value::from(true)),
        ("remark", Value::Null),
    ])
}

fn count_row(n: i64) -> Row {
    Row::from_pairs([("COUNT(1)", n)])
}

fn enabled_tenants() -> fluentsql::Fetch<Tenant> {
    select([Tenant::ID, Tenant::NAME, Tenant::ENABLE, Tenant::REMARK])
        .from::<Tenant>()
        .matching(where_(Tenant::ENABLE).eq(true))
        .order([desc(Tenant::ID)])
        .fetch::<Tenant>()
}

// Tests that touch the process-wide executor take this lock.
static GLOBAL: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

#[tokio::test]
async fn all_maps_rows_and_passes_parameters() {
    let mock = MockExecutor::returning([vec![tenant_row(2, "b"), tenant_row(1, "a")]]);

    let tenants = enabled_tenants().all_with(&mock).await.unwrap();
    assert_eq!(tenants.len(), 2);
    assert_eq!(tenants[0].name, "b");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "SELECT t1.`id` AS `id`, t1.`name` AS `name`, t1.`enable` AS `enable`, \
         t1.`remark` AS `remark` FROM `saas_tenant` `t1` WHERE t1.`enable` = ? \
         ORDER BY t1.`id` DESC"
    );
    assert_eq!(calls[0].1, vec![Value::Bool(true)]);
}

#[tokio::test]
async fn one_returns_first_row_or_none() {
    let mock = MockExecutor::returning([vec![tenant_row(7, "acme")], vec![]]);
    let fetch = enabled_tenants();

    let found = fetch.one_with(&mock).await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(7));

    assert_eq!(fetch.one_with(&mock).await.unwrap(), None);
}

#[tokio::test]
async fn not_found_is_normalized_to_none() {
    let mock = MockExecutor::failing(FluentError::not_found("no rows"));
    assert_eq!(enabled_tenants().one_with(&mock).await.unwrap(), None);
}

#[tokio::test]
async fn executor_errors_propagate_unchanged() {
    let mock = MockExecutor::failing(FluentError::execution(std::io::Error::other("down")));
    let err = enabled_tenants().one_with(&mock).await.unwrap_err();
    assert!(matches!(err, FluentError::Execution(_)));
    assert_eq!(err.to_string(), "Execution error: down");

    let mock = MockExecutor::failing(FluentError::not_found("no rows"));
    let err = enabled_tenants().all_with(&mock).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn count_uses_count_statement() {
    let mock = MockExecutor::returning([vec![count_row(42)]]);
    let total = enabled_tenants().count_with(&mock).await.unwrap();
    assert_eq!(total, 42);

    let calls = mock.calls();
    assert_eq!(
        calls[0].0,
        "SELECT COUNT(1) FROM `saas_tenant` `t1` WHERE t1.`enable` = ?"
    );
}

#[tokio::test]
async fn page_counts_then_fetches_slice() {
    let mock = MockExecutor::returning([
        vec![count_row(21)],
        vec![tenant_row(11, "k"), tenant_row(10, "j")],
    ]);

    let page = enabled_tenants()
        .page_with(&mock, DataPage::new(2, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total, 21);
    assert_eq!(page.pages(), 3);
    assert_eq!(page.list.len(), 2);

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.starts_with("SELECT COUNT(1) FROM"));
    assert!(calls[1].0.ends_with("ORDER BY t1.`id` DESC LIMIT 10 OFFSET 10"));
    assert_eq!(calls[1].1, vec![Value::Bool(true)]);
}

#[tokio::test]
async fn page_of_a_limited_chain_uses_page_bounds() {
    let mock = MockExecutor::returning([vec![count_row(12)], vec![tenant_row(3, "c")]]);

    let page = select_all()
        .from::<Tenant>()
        .limit(2)
        .fetch::<Tenant>()
        .page_with(&mock, DataPage::new(2, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total, 12);

    let calls = mock.calls();
    assert_eq!(calls[0].0, "SELECT COUNT(1) FROM `saas_tenant` `t1`");
    assert_eq!(calls[1].0, "SELECT * FROM `saas_tenant` `t1` LIMIT 5 OFFSET 5");
}

#[tokio::test]
async fn grouped_count_counts_groups() {
    let mock = MockExecutor::returning([vec![count_row(4)]]);
    let total = select([Tenant::NAME])
        .from::<Tenant>()
        .group_by([Tenant::NAME])
        .fetch::<Tenant>()
        .count_with(&mock)
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(
        mock.calls()[0].0,
        "SELECT COUNT(1) FROM (SELECT t1.`name` AS `name` FROM `saas_tenant` `t1` \
         GROUP BY t1.`name`) `counted`"
    );
}

#[tokio::test]
async fn empty_page_skips_row_query() {
    let mock = MockExecutor::returning([vec![count_row(0)]]);
    let page = enabled_tenants()
        .page_with(&mock, DataPage::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.list.is_empty());
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn invalid_page_fails_before_execution() {
    let mock = MockExecutor::default();
    let request = DataPage {
        size: 0,
        ..DataPage::default()
    };
    let err = enabled_tenants().page_with(&mock, request).await.unwrap_err();
    assert!(err.is_validation());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn update_returns_affected_rows() {
    let mock = MockExecutor {
        affected: 3,
        ..MockExecutor::default()
    };
    let affected = update::<Tenant>()
        .set(Tenant::NAME, "acme")
        .set(Tenant::REMARK, None::<String>)
        .then()
        .matching(where_(Tenant::ENABLE).eq(false))
        .execute_with(&mock)
        .await
        .unwrap();
    assert_eq!(affected, 3);

    let calls = mock.calls();
    assert_eq!(
        calls[0].0,
        "UPDATE `saas_tenant` SET `name` = ? WHERE `enable` = ?"
    );
    assert_eq!(
        calls[0].1,
        vec![Value::Text("acme".into()), Value::Bool(false)]
    );
}

#[tokio::test]
async fn build_errors_never_reach_the_executor() {
    let mock = MockExecutor::default();
    let err = update::<Tenant>()
        .then()
        .execute_with(&mock)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = select_all()
        .from::<Tenant>()
        .limit(-1)
        .fetch::<Tenant>()
        .all_with(&mock)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn global_executor_binding() {
    let _guard = GLOBAL.lock().await;

    fluentsql::unbind();
    let err = enabled_tenants().all().await.unwrap_err();
    assert!(err.is_configuration());

    let mock = Arc::new(MockExecutor::returning([vec![tenant_row(1, "a")]]));
    fluentsql::bind(Arc::clone(&mock));

    let tenants = enabled_tenants().all().await.unwrap();
    assert_eq!(tenants.len(), 1);
    assert_eq!(mock.calls().len(), 1);

    let affected = update::<Tenant>()
        .set(Tenant::ENABLE, false)
        .then()
        .execute()
        .await
        .unwrap();
    assert_eq!(affected, 0);

    fluentsql::unbind();
    assert!(matches!(fluentsql::current(), Err(e) if e.is_configuration()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_builds_keep_aliases_isolated() {
    let tasks = (0..32).map(|i| {
        tokio::spawn(async move {
            let alias = format!("a{i}");
            let bound = select([Tenant::ID])
                .from_as::<Tenant>(&alias)
                .join::<SaasOrder>()
                .on(where_(SaasOrder::TENANT_ID).eq_field(Tenant::ID))
                .matching(where_(SaasOrder::AMOUNT).gt(i))
                .build()
                .unwrap();
            (i, alias, bound)
        })
    });

    for joined in futures_util::future::join_all(tasks).await {
        let (i, alias, bound) = joined.unwrap();
        assert_eq!(
            bound.sql(),
            format!(
                "SELECT {alias}.`id` AS `id` FROM `saas_tenant` `{alias}` \
                 INNER JOIN `saas_order` `t1` ON t1.`tenant_id` = {alias}.`id` \
                 WHERE t1.`amount` > ?"
            )
        );
        assert_eq!(bound.parameters(), &[Value::Int(i)]);
    }
}
