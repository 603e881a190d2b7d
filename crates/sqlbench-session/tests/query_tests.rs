//! Integration tests for running tab queries and schema access

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use sqlbench_core::{Driver, Pagination, QueryResult, TableColumn, TableSchema};
use sqlbench_schema::SCHEMA_CACHE_TTL;
use sqlbench_session::{NewTab, SessionError, TabPatch};
use std::collections::BTreeMap;

use common::{MockBackend, manager_with, mock_query_result, orders_table, users_table};

const CONN: &str = "conn-1";

#[tokio::test]
async fn console_runs_each_statement_in_order() {
    let backend = MockBackend::new().with_query_response(
        "SELECT id",
        mock_query_result(vec!["id"], vec![vec![json!(5)]]),
    );
    let (manager, backend, _) = manager_with(backend);
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager.active_tab_id(CONN).unwrap();

    manager
        .update_tab(
            CONN,
            tab,
            TabPatch {
                query: Some("UPDATE t SET a = ';' WHERE id = :id;\nSELECT id FROM t WHERE id = :id;".into()),
                query_params: Some(BTreeMap::from([("id".to_string(), "5".to_string())])),
                ..TabPatch::default()
            },
        )
        .unwrap();

    manager.run_tab_query(CONN, tab).await.unwrap();

    assert_eq!(
        backend.executions(),
        vec![
            ("UPDATE t SET a = ';' WHERE id = 5".to_string(), None, None),
            ("SELECT id FROM t WHERE id = 5".to_string(), Some(100), Some(1)),
        ]
    );

    let tab = manager.tab(CONN, tab).unwrap();
    assert_eq!(tab.result.map(|r| r.rows), Some(vec![vec![json!(5)]]));
    assert_eq!(tab.error, None);
    assert!(!tab.is_loading);
    assert!(tab.execution_time.is_some());
}

#[tokio::test]
async fn failing_statement_stops_execution() {
    let backend = MockBackend::new().with_failing_statement("broken");
    let (manager, backend, _) = manager_with(backend);
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager
        .create_tab(
            CONN,
            NewTab::console().with_query("SELECT 1; SELECT broken; SELECT 3"),
        )
        .unwrap();

    let err = manager.run_tab_query(CONN, tab).await.unwrap_err();

    assert!(matches!(err, SessionError::Bench(_)));
    assert_eq!(backend.executed_sql(), vec!["SELECT 1", "SELECT broken"]);
    let tab = manager.tab(CONN, tab).unwrap();
    assert!(tab.error.unwrap().contains("syntax error"));
    assert_eq!(tab.result, None);
    assert!(!tab.is_loading);
}

#[tokio::test]
async fn table_tab_sends_browse_query_with_paging() {
    let (manager, backend, _) = manager_with(MockBackend::new().with_table(orders_table()));
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager
        .create_tab(CONN, NewTab::table("orders").with_schema("sales"))
        .unwrap();
    manager
        .update_tab(
            CONN,
            tab,
            TabPatch {
                filter_clause: Some(Some("total > 10".into())),
                sort_clause: Some(Some("  ".into())),
                page: Some(2),
                ..TabPatch::default()
            },
        )
        .unwrap();

    manager.run_tab_query(CONN, tab).await.unwrap();

    assert_eq!(
        backend.executions(),
        vec![(
            r#"SELECT * FROM "sales"."orders" WHERE total > 10"#.to_string(),
            Some(100),
            Some(2)
        )]
    );
    assert_eq!(
        manager.tab(CONN, tab).unwrap().pk_column.as_deref(),
        Some("order_id")
    );
}

#[tokio::test]
async fn explicit_limit_disables_paging() {
    let (manager, backend, _) = manager_with(MockBackend::new().with_table(orders_table()));
    manager.open_connection(CONN, Driver::Mysql).await;
    let tab = manager.create_tab(CONN, NewTab::table("orders")).unwrap();
    manager
        .update_tab(
            CONN,
            tab,
            TabPatch {
                limit_clause: Some(Some(10)),
                ..TabPatch::default()
            },
        )
        .unwrap();

    manager.run_tab_query(CONN, tab).await.unwrap();

    assert_eq!(
        backend.executions(),
        vec![("SELECT * FROM `orders` LIMIT 10".to_string(), None, None)]
    );
}

#[tokio::test]
async fn unbound_table_tab_cannot_run() {
    let (manager, _, _) = manager_with(MockBackend::new());
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager.create_tab(CONN, NewTab::table("orders")).unwrap();
    manager
        .update_tab(
            CONN,
            tab,
            TabPatch {
                active_table: Some(None),
                ..TabPatch::default()
            },
        )
        .unwrap();

    let err = manager.run_tab_query(CONN, tab).await.unwrap_err();
    assert!(matches!(err, SessionError::NoTableBound(id) if id == tab));
}

#[tokio::test]
async fn console_read_binds_table_and_primary_key() {
    let (manager, _, _) = manager_with(MockBackend::new().with_table(users_table()));
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager
        .create_tab(CONN, NewTab::console().with_query("SELECT * FROM users"))
        .unwrap();

    manager.run_tab_query(CONN, tab).await.unwrap();

    let bound = manager.tab(CONN, tab).unwrap();
    assert_eq!(bound.active_table.as_deref(), Some("users"));
    assert_eq!(bound.pk_column.as_deref(), Some("id"));

    manager
        .update_tab(
            CONN,
            tab,
            TabPatch {
                query: Some("SELECT count(*) FROM users".into()),
                ..TabPatch::default()
            },
        )
        .unwrap();
    manager.run_tab_query(CONN, tab).await.unwrap();

    let unbound = manager.tab(CONN, tab).unwrap();
    assert_eq!(unbound.active_table, None);
    assert_eq!(unbound.pk_column, None);
}

#[tokio::test]
async fn schema_is_cached_until_refreshed() {
    let (manager, backend, _) = manager_with(MockBackend::new().with_table(users_table()));
    manager.open_connection(CONN, Driver::Postgres).await;

    let first = manager.schema(CONN).await.unwrap();
    let second = manager.schema(CONN).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(backend.snapshot_count(), 1);
    assert_eq!(manager.schema_version(CONN).unwrap(), 0);

    manager.refresh_schema(CONN).await.unwrap();

    assert_eq!(manager.schema_version(CONN).unwrap(), 1);
    assert_eq!(backend.snapshot_count(), 2);
}

#[test]
fn schema_snapshots_stay_fresh_for_five_minutes() {
    let (manager, _, _) = manager_with(MockBackend::new());
    assert_eq!(manager.schema_cache().ttl(), SCHEMA_CACHE_TTL);
    assert_eq!(SCHEMA_CACHE_TTL, std::time::Duration::from_secs(300));
}

#[tokio::test]
async fn columns_fall_back_to_backend_for_unknown_tables() {
    let (manager, _, _) = manager_with(MockBackend::new().with_table(users_table()));
    manager.open_connection(CONN, Driver::Postgres).await;

    let columns = manager.table_columns(CONN, "users", None).await.unwrap();
    assert_eq!(columns.len(), 4);

    let err = manager.table_columns(CONN, "ghosts", None).await.unwrap_err();
    assert!(matches!(err, SessionError::Bench(_)));
}

#[tokio::test]
async fn cancel_is_forwarded_to_backend() {
    let (manager, backend, _) = manager_with(MockBackend::new());
    manager.open_connection(CONN, Driver::Postgres).await;

    manager.cancel_query(CONN).await.unwrap();

    assert_eq!(backend.cancel_count(), 1);
}

#[tokio::test]
async fn columns_follow_the_requested_schema() {
    let backend = MockBackend::new()
        .with_table(TableSchema::new("users", vec![TableColumn::new("uid", "int")]).with_schema("public"))
        .with_table(users_table().with_schema("audit"));
    let (manager, backend, _) = manager_with(backend);
    manager.open_connection(CONN, Driver::Postgres).await;

    let audit = manager
        .table_columns(CONN, "users", Some("audit"))
        .await
        .unwrap();
    assert_eq!(
        audit.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "email", "status", "nickname"]
    );
    assert!(backend.column_lookups().is_empty());

    // Bare name is ambiguous in the snapshot
    manager.table_columns(CONN, "users", None).await.unwrap();
    assert_eq!(backend.column_lookups(), vec![("users".to_string(), None)]);
}

#[tokio::test]
async fn page_navigation_is_clamped_to_reported_pages() {
    let paged = QueryResult {
        pagination: Some(Pagination {
            page: 1,
            page_size: 100,
            total_rows: 250,
        }),
        ..mock_query_result(vec!["id"], vec![vec![json!(1)]])
    };
    let (manager, backend, _) =
        manager_with(MockBackend::new().with_query_response("FROM \"orders\"", paged));
    manager.open_connection(CONN, Driver::Postgres).await;
    let tab = manager.create_tab(CONN, NewTab::table("orders")).unwrap();

    // Nothing known about the result yet
    assert_eq!(manager.go_to_page(CONN, tab, 0).unwrap(), 1);

    manager.run_tab_query(CONN, tab).await.unwrap();
    assert_eq!(manager.go_to_page(CONN, tab, 9).unwrap(), 3);
    assert_eq!(manager.tab(CONN, tab).unwrap().page, 3);

    manager.run_tab_query(CONN, tab).await.unwrap();
    assert_eq!(backend.executions().last().map(|e| e.2), Some(Some(3)));
}
