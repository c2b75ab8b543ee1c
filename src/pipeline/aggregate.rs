//! Post-pass aggregators. They read and update rows that earlier phases
//! committed, so they only run once every entry is in place.

use rusqlite::Connection;

use crate::db::{repository, DatabaseError};

/// Dialogue text longer than this is truncated in a fallback title.
const TITLE_TEXT_LIMIT: usize = 39;
/// Characters kept from truncated dialogue text.
const TITLE_TEXT_KEEP: usize = 36;
/// Conversations with at most this many entries are dead ends.
const DEAD_END_MAX_ENTRIES: i64 = 2;

/// Synthesize a display title for an entry that has none.
///
/// A missing actor name renders as an empty string.
pub fn fallback_title(actor_name: Option<&str>, dialogue_text: Option<&str>) -> String {
    let name = actor_name.unwrap_or_default();
    match dialogue_text {
        None | Some("") => name.to_string(),
        Some(text) if text.chars().count() > TITLE_TEXT_LIMIT => {
            let kept: String = text.chars().take(TITLE_TEXT_KEEP).collect();
            format!("{name}: \"{kept}...\"")
        }
        Some(text) => format!("{name}: \"{text}\""),
    }
}

pub fn is_dead_end(total_entries: i64) -> bool {
    total_entries <= DEAD_END_MAX_ENTRIES
}

/// Fill `displayTitle` for every entry with an empty title.
/// Returns the number of entries updated.
pub fn backfill_entry_titles(conn: &Connection) -> Result<usize, DatabaseError> {
    let untitled = repository::get_untitled_entries(conn)?;
    if untitled.is_empty() {
        tracing::warn!("No untitled dialogue entries to backfill");
        return Ok(0);
    }

    for entry in &untitled {
        let title = fallback_title(entry.actor_name.as_deref(), entry.dialogue_text.as_deref());
        repository::update_entry_display_title(conn, entry.conversation_id, entry.id, &title)?;
    }
    Ok(untitled.len())
}

/// Set each speaking actor's talkativeness to its entry count.
/// Actors without entries keep their mapped value.
pub fn compute_talkativeness(conn: &Connection) -> Result<usize, DatabaseError> {
    let counts = repository::count_entries_by_actor(conn)?;
    if counts.is_empty() {
        tracing::warn!("No dialogue entries reference an actor; talkativeness unchanged");
        return Ok(0);
    }

    for (actor_id, total) in &counts {
        repository::update_actor_talkativeness(conn, *actor_id, *total)?;
    }
    Ok(counts.len())
}

/// Set `totalEntries` and `isDeadEnd` on every conversation that has entries.
pub fn compute_entry_counts(conn: &Connection) -> Result<usize, DatabaseError> {
    let counts = repository::count_entries_by_conversation(conn)?;
    if counts.is_empty() {
        tracing::warn!("No dialogue entries found; conversation counts unchanged");
        return Ok(0);
    }

    for (conversation_id, total) in &counts {
        repository::update_conversation_entry_count(
            conn,
            *conversation_id,
            *total,
            is_dead_end(*total),
        )?;
    }
    Ok(counts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::SCHEMA_STATEMENTS;
    use crate::db::sqlite::{apply_schema, open_memory_database};
    use crate::models::FieldValue;

    fn test_db() -> Connection {
        let conn = open_memory_database().unwrap();
        apply_schema(&conn, SCHEMA_STATEMENTS).unwrap();
        conn
    }

    fn entry(conn: &Connection, conversation_id: i64, id: i64, actor: i64, title: &str, text: &str) {
        repository::upsert_row(
            conn,
            "dentries",
            &["id", "conversationid", "actor", "title", "dialoguetext"],
            &[
                Some(FieldValue::Integer(id)),
                Some(FieldValue::Integer(conversation_id)),
                Some(FieldValue::Integer(actor)),
                Some(FieldValue::from(title)),
                Some(FieldValue::from(text)),
            ],
        )
        .unwrap();
    }

    #[test]
    fn long_text_is_truncated() {
        let text = "a".repeat(50);
        let expected = format!("Kim: \"{}...\"", "a".repeat(36));
        assert_eq!(fallback_title(Some("Kim"), Some(&text)), expected);
    }

    #[test]
    fn boundary_text_is_kept_whole() {
        let text = "b".repeat(39);
        assert_eq!(fallback_title(Some("Kim"), Some(&text)), format!("Kim: \"{text}\""));
    }

    #[test]
    fn truncation_counts_characters() {
        let text = "é".repeat(40);
        let title = fallback_title(Some("Cuno"), Some(&text));
        assert_eq!(title, format!("Cuno: \"{}...\"", "é".repeat(36)));
    }

    #[test]
    fn empty_text_yields_name_only() {
        assert_eq!(fallback_title(Some("Kim"), None), "Kim");
        assert_eq!(fallback_title(Some("Kim"), Some("")), "Kim");
        assert_eq!(fallback_title(None, Some("Hi")), ": \"Hi\"");
    }

    #[test]
    fn dead_end_threshold() {
        assert!(is_dead_end(1));
        assert!(is_dead_end(2));
        assert!(!is_dead_end(3));
    }

    #[test]
    fn backfill_only_touches_untitled_entries() {
        let conn = test_db();
        repository::upsert_row(
            &conn,
            "actors",
            &["id", "name"],
            &[Some(1_i64.into()), Some("Kim".into())],
        )
        .unwrap();
        entry(&conn, 1, 1, 1, "", "Detective.");
        entry(&conn, 1, 2, 1, "Greeting", "Hello.");

        assert_eq!(backfill_entry_titles(&conn).unwrap(), 1);
        let titles: Vec<Option<String>> = conn
            .prepare("SELECT displayTitle FROM dentries ORDER BY id")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(titles, vec![Some("Kim: \"Detective.\"".to_string()), None]);
    }

    #[test]
    fn talkativeness_leaves_silent_actors_alone() {
        let conn = test_db();
        for (id, talk) in [(1_i64, 0_i64), (2, 7)] {
            repository::upsert_row(
                &conn,
                "actors",
                &["id", "talkativeness"],
                &[Some(id.into()), Some(talk.into())],
            )
            .unwrap();
        }
        entry(&conn, 1, 1, 1, "a", "x");
        entry(&conn, 1, 2, 1, "b", "y");
        entry(&conn, 2, 1, 1, "c", "z");

        assert_eq!(compute_talkativeness(&conn).unwrap(), 1);
        let talk = |id: i64| -> i64 {
            conn.query_row("SELECT talkativeness FROM actors WHERE id = ?1", [id], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(talk(1), 3);
        assert_eq!(talk(2), 7);
    }

    #[test]
    fn entry_counts_flag_dead_ends() {
        let conn = test_db();
        for id in [1_i64, 2, 3] {
            repository::upsert_row(&conn, "conversations", &["id"], &[Some(id.into())]).unwrap();
        }
        entry(&conn, 1, 1, 1, "a", "x");
        entry(&conn, 1, 2, 1, "b", "x");
        entry(&conn, 2, 1, 1, "c", "x");
        entry(&conn, 2, 2, 1, "d", "x");
        entry(&conn, 2, 3, 1, "e", "x");

        assert_eq!(compute_entry_counts(&conn).unwrap(), 2);
        let row = |id: i64| -> (Option<i64>, Option<bool>) {
            conn.query_row(
                "SELECT totalEntries, isDeadEnd FROM conversations WHERE id = ?1",
                [id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap()
        };
        assert_eq!(row(1), (Some(2), Some(true)));
        assert_eq!(row(2), (Some(3), Some(false)));
        assert_eq!(row(3), (None, None));
    }

    #[test]
    fn empty_tables_aggregate_nothing() {
        let conn = test_db();
        assert_eq!(compute_talkativeness(&conn).unwrap(), 0);
        assert_eq!(compute_entry_counts(&conn).unwrap(), 0);
        assert_eq!(backfill_entry_titles(&conn).unwrap(), 0);
    }
}
