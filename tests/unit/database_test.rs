//! Unit tests for the calmfeed database layer (connection + migrations).

use calmfeed::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use calmfeed::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_storage_table() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='storage_area'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "Table 'storage_area' should exist after migrations");
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_file_is_idempotent() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join("calmfeed.db");
    {
        let db = Database::open(&path).expect("first open failed");
        db.connection()
            .execute(
                "INSERT INTO storage_area (key, value, updated_at) VALUES ('k', '1', 0)",
                [],
            )
            .unwrap();
    }
    let db = Database::open(&path).expect("second open failed");
    let value: String = db
        .connection()
        .query_row("SELECT value FROM storage_area WHERE key = 'k'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, "1");
    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, CURRENT_SCHEMA_VERSION as i64);
}
