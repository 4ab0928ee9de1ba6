use orgcatalog_core::db::migrations::latest_version;
use orgcatalog_core::db::seed::seed_demo_data;
use orgcatalog_core::db::{open_db, open_db_in_memory, open_existing_db, DbError};
use orgcatalog_core::{RepoError, SqliteOrganizationStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "buildings",
        "activities",
        "organizations",
        "organization_phones",
        "organization_activities",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite3");

    let mut conn_first = open_db(&path).unwrap();
    seed_demo_data(&mut conn_first).unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_eq!(count_rows(&conn_second, "organizations"), 3);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_missing_database_without_create_fails_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.sqlite3");

    let err = open_existing_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
            if failure.code == rusqlite::ErrorCode::CannotOpen
    ));
    assert!(!path.exists());
}

#[test]
fn opening_existing_database_without_create_reads_seeded_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite3");

    let mut conn = open_db(&path).unwrap();
    seed_demo_data(&mut conn).unwrap();
    drop(conn);

    let conn = open_existing_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_eq!(count_rows(&conn, "organizations"), 3);
}

#[test]
fn seeding_twice_keeps_one_copy_of_demo_rows() {
    let mut conn = open_db_in_memory().unwrap();
    seed_demo_data(&mut conn).unwrap();
    seed_demo_data(&mut conn).unwrap();

    assert_eq!(count_rows(&conn, "activities"), 5);
    assert_eq!(count_rows(&conn, "buildings"), 2);
    assert_eq!(count_rows(&conn, "organizations"), 3);
    assert_eq!(count_rows(&conn, "organization_phones"), 4);
    assert_eq!(count_rows(&conn, "organization_activities"), 3);
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteOrganizationStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        } if expected_version == latest_version()
    ));
}

#[test]
fn store_rejects_schema_missing_a_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE organization_phones;").unwrap();

    let err = SqliteOrganizationStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredTable("organization_phones")
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
