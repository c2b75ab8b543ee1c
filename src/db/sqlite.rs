use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Open (or create) the output SQLite database at the given path
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA synchronous=NORMAL;",
    )?;
    Ok(())
}

/// Drop every user table so a build starts from an empty store.
///
/// Returns the names of the dropped tables.
pub fn drop_all_tables(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;
    drop(stmt);

    for table in &tables {
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{}\"",
            table.replace('"', "\"\"")
        ))?;
        tracing::debug!(table = %table, "Dropped table");
    }
    Ok(tables)
}

/// Apply a schema given as pre-separated statements.
///
/// Each element is handed to SQLite's own parser, so an element may still hold
/// several statements (a whole script read from disk, for instance). Returns
/// the number of non-blank elements executed.
pub fn apply_schema<S: AsRef<str>>(
    conn: &Connection,
    statements: &[S],
) -> Result<usize, DatabaseError> {
    let mut executed = 0;
    for (index, statement) in statements.iter().enumerate() {
        let sql = statement.as_ref();
        if sql.trim().is_empty() {
            continue;
        }
        tracing::debug!(index, "Executing schema statement");
        conn.execute_batch(sql)
            .map_err(|e| DatabaseError::SchemaFailed {
                index,
                reason: e.to_string(),
            })?;
        executed += 1;
    }
    Ok(executed)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::SCHEMA_STATEMENTS;

    #[test]
    fn bundled_schema_creates_all_tables() {
        let conn = open_memory_database().unwrap();
        apply_schema(&conn, SCHEMA_STATEMENTS).unwrap();
        // actors, items, variables, conversations, dentries, dlinks,
        // subtasks, alternates, modifiers, checks
        assert_eq!(count_tables(&conn).unwrap(), 10);
    }

    #[test]
    fn schema_apply_idempotent() {
        let conn = open_memory_database().unwrap();
        apply_schema(&conn, SCHEMA_STATEMENTS).unwrap();
        assert!(apply_schema(&conn, SCHEMA_STATEMENTS).is_ok());
    }

    #[test]
    fn semicolon_inside_literal_survives() {
        let conn = open_memory_database().unwrap();
        apply_schema(
            &conn,
            &[
                "CREATE TABLE notes (body TEXT DEFAULT 'a;b')",
                "INSERT INTO notes DEFAULT VALUES",
            ],
        )
        .unwrap();
        let body: String = conn
            .query_row("SELECT body FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "a;b");
    }

    #[test]
    fn failing_statement_reports_index() {
        let conn = open_memory_database().unwrap();
        let err = apply_schema(&conn, &["CREATE TABLE ok (id INTEGER)", "CREATE TABLE ("])
            .unwrap_err();
        assert!(matches!(err, DatabaseError::SchemaFailed { index: 1, .. }));
    }

    #[test]
    fn blank_statements_are_not_counted() {
        let conn = open_memory_database().unwrap();
        let executed = apply_schema(&conn, &["CREATE TABLE a (x)", "  ", ""]).unwrap();
        assert_eq!(executed, 1);
        assert_eq!(count_tables(&conn).unwrap(), 1);
    }

    #[test]
    fn drop_all_tables_empties_database() {
        let conn = open_memory_database().unwrap();
        apply_schema(&conn, SCHEMA_STATEMENTS).unwrap();
        let dropped = drop_all_tables(&conn).unwrap();
        assert_eq!(dropped.len(), 10);
        assert_eq!(count_tables(&conn).unwrap(), 0);
    }

    #[test]
    fn database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discobase.sqlite3");
        let conn = open_database(&path).unwrap();
        apply_schema(&conn, SCHEMA_STATEMENTS).unwrap();
        drop(conn);

        let reopened = open_database(&path).unwrap();
        assert_eq!(count_tables(&reopened).unwrap(), 10);
    }
}
