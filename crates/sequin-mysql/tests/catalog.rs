//! Catalog introspection against the in-memory driver.

use sequin_mysql::{
    AdapterOptions, CatalogItemKind, MysqlAdapter, MysqlConnection, RelationKind,
};
use sequin_testing::MockServer;

fn fixture_server() -> MockServer {
    let server = MockServer::new();
    server.add_database("app");
    server.add_table("app", "users");
    server.add_column("app", "users", "id", "int");
    server.add_column("app", "users", "name", "varchar");
    server.add_column("app", "users", "bio", "longtext");
    server.add_view("app", "active_users");
    server.add_column("app", "active_users", "id", "int");
    server.add_database("archive");
    server.add_table("archive", "events");
    server.add_column("archive", "events", "payload", "json");
    // System schemas never surface in the catalog.
    server.add_database("mysql");
    server.add_table("mysql", "user");
    server
}

fn connect(server: &MockServer) -> MysqlConnection {
    MysqlAdapter::new(AdapterOptions::default(), server.factory())
        .expect("valid options")
        .connect()
        .expect("connect")
}

#[test]
fn databases_are_sorted_and_exclude_system_schemas() {
    let server = fixture_server();
    let conn = connect(&server);
    assert_eq!(conn.get_databases().expect("query"), ["app", "archive"]);
}

#[test]
fn relations_report_names_and_kinds_in_order() {
    let server = fixture_server();
    let conn = connect(&server);
    assert_eq!(
        conn.get_relations("app").expect("query"),
        [
            ("active_users".to_string(), RelationKind::View),
            ("users".to_string(), RelationKind::Table),
        ]
    );
    assert!(conn.get_relations("no_such_db").expect("query").is_empty());
}

#[test]
fn columns_come_back_in_declaration_order() {
    let server = fixture_server();
    let conn = connect(&server);
    assert_eq!(
        conn.get_columns("app", "users").expect("query"),
        [
            ("id".to_string(), "int".to_string()),
            ("name".to_string(), "varchar".to_string()),
            ("bio".to_string(), "longtext".to_string()),
        ]
    );
}

#[test]
fn catalog_tree_is_fully_qualified_and_typed() {
    let server = fixture_server();
    let conn = connect(&server);
    let catalog = conn.get_catalog().expect("catalog");

    assert_eq!(catalog.items.len(), 2);
    let app = &catalog.items[0];
    assert_eq!(app.qualified_identifier, "`app`");
    assert_eq!(app.label, "app");
    assert_eq!(app.type_label, "db");
    assert_eq!(app.kind, CatalogItemKind::Database);

    let users = &app.children[1];
    assert_eq!(users.qualified_identifier, "`app`.`users`");
    assert_eq!(users.query_name, "`app`.`users`");
    assert_eq!(users.type_label, "t");
    assert_eq!(users.kind, CatalogItemKind::Table);

    let view = &app.children[0];
    assert_eq!(view.type_label, "v");
    assert_eq!(view.kind, CatalogItemKind::View);

    let name = &users.children[1];
    assert_eq!(name.qualified_identifier, "`app`.`users`.`name`");
    assert_eq!(name.query_name, "`name`");
    assert_eq!(name.type_label, "s");
    assert!(name.children.is_empty());

    let bio = &users.children[2];
    assert_eq!(bio.type_label, "ss");

    let payload = &catalog.items[1].children[0].children[0];
    assert_eq!(payload.label, "payload");
    assert_eq!(payload.type_label, "{}");
}

#[test]
fn exhausted_pool_makes_introspection_fail_loudly() {
    let server = fixture_server();
    let conn = connect(&server);

    let mut held = Vec::new();
    for _ in 0..conn.pool().capacity() {
        held.push(
            conn.acquire(true)
                .expect("acquire")
                .expect("connection available"),
        );
    }

    let err = conn.get_databases().expect_err("no connection left");
    assert!(matches!(
        err,
        sequin_mysql::AdapterError::ConnectionExhausted
    ));
}
