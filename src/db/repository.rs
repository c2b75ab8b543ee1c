use rusqlite::{params, params_from_iter, Connection};

use super::DatabaseError;
use crate::models::Cell;

fn insert_sql(verb: &str, table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "{verb} INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Insert a row, replacing any existing row with the same key.
pub fn upsert_row(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    values: &[Cell],
) -> Result<(), DatabaseError> {
    debug_assert_eq!(columns.len(), values.len());
    let mut stmt = conn.prepare_cached(&insert_sql("INSERT OR REPLACE", table, columns))?;
    stmt.execute(params_from_iter(values.iter()))?;
    Ok(())
}

// ═══════════════════════════════════════════
// Dialogue entry flags
// ═══════════════════════════════════════════

pub fn update_entry_flags(
    conn: &Connection,
    conversation_id: i64,
    dialogue_id: i64,
    has_alts: bool,
    has_check: bool,
    total_modifiers: usize,
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE dentries SET hasAlts = ?1, hasCheck = ?2, totalModifiers = ?3
         WHERE conversationid = ?4 AND id = ?5",
    )?;
    stmt.execute(params![
        has_alts as i32,
        has_check as i32,
        total_modifiers as i64,
        conversation_id,
        dialogue_id,
    ])?;
    Ok(())
}

// ═══════════════════════════════════════════
// Aggregation queries
// ═══════════════════════════════════════════

/// `(actor id, entry count)` for every actor referenced by an entry.
pub fn count_entries_by_actor(conn: &Connection) -> Result<Vec<(i64, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT actor, COUNT(*) FROM dentries
         WHERE actor IS NOT NULL
         GROUP BY actor",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_actor_talkativeness(
    conn: &Connection,
    actor_id: i64,
    talkativeness: i64,
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare_cached("UPDATE actors SET talkativeness = ?1 WHERE id = ?2")?;
    stmt.execute(params![talkativeness, actor_id])?;
    Ok(())
}

/// `(conversation id, entry count)` for every conversation that has entries.
pub fn count_entries_by_conversation(
    conn: &Connection,
) -> Result<Vec<(i64, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT conversationid, COUNT(*) FROM dentries
         GROUP BY conversationid",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_conversation_entry_count(
    conn: &Connection,
    conversation_id: i64,
    total_entries: i64,
    is_dead_end: bool,
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE conversations SET totalEntries = ?1, isDeadEnd = ?2 WHERE id = ?3",
    )?;
    stmt.execute(params![total_entries, is_dead_end as i32, conversation_id])?;
    Ok(())
}

/// A dialogue entry without a title, joined with its actor's name.
#[derive(Debug, Clone, PartialEq)]
pub struct UntitledEntry {
    pub conversation_id: i64,
    pub id: i64,
    pub actor_name: Option<String>,
    pub dialogue_text: Option<String>,
}

pub fn get_untitled_entries(conn: &Connection) -> Result<Vec<UntitledEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.conversationid, d.id, a.name, d.dialoguetext
         FROM dentries d
         LEFT JOIN actors a ON a.id = d.actor
         WHERE d.title IS NULL OR d.title = ''",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(UntitledEntry {
                conversation_id: row.get(0)?,
                id: row.get(1)?,
                actor_name: row.get(2)?,
                dialogue_text: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_entry_display_title(
    conn: &Connection,
    conversation_id: i64,
    dialogue_id: i64,
    display_title: &str,
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE dentries SET displayTitle = ?1 WHERE conversationid = ?2 AND id = ?3",
    )?;
    stmt.execute(params![display_title, conversation_id, dialogue_id])?;
    Ok(())
}

/// Row count of a table (for reporting and verification)
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(count)
}
