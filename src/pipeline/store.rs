//! Row writers: turn mapped rows and expanded blocks into upserts.

use rusqlite::Connection;

use super::blocks::{BlockFamily, EntryChecks, SlotBlock};
use super::mapper::EntityMapper;
use crate::db::{repository, DatabaseError};
use crate::models::{Cell, FieldValue, SourceEntity};

/// Map one entity and upsert it into the mapper's table.
pub fn upsert_entity<E: SourceEntity>(
    conn: &Connection,
    mapper: &EntityMapper<E>,
    entity: &E,
) -> Result<(), DatabaseError> {
    repository::upsert_row(conn, mapper.table, &mapper.column_names(), &mapper.row(entity))
}

/// Upsert a mapped row with extra computed columns appended.
pub fn upsert_entity_with<E: SourceEntity>(
    conn: &Connection,
    mapper: &EntityMapper<E>,
    entity: &E,
    extra: &[(&'static str, Cell)],
) -> Result<(), DatabaseError> {
    let mut columns = mapper.column_names();
    let mut values = mapper.row(entity);
    for (column, value) in extra {
        columns.push(*column);
        values.push(value.clone());
    }
    repository::upsert_row(conn, mapper.table, &columns, &values)
}

/// Write one slot of a block family. Row layout is
/// `id, <context columns>, <family columns>`.
pub fn insert_slot_block(
    conn: &Connection,
    family: &BlockFamily,
    context: &[Cell],
    block: &SlotBlock,
) -> Result<(), DatabaseError> {
    debug_assert_eq!(context.len(), family.context.len());

    let mut columns = Vec::with_capacity(1 + family.context.len() + family.columns.len());
    columns.push("id");
    columns.extend_from_slice(family.context);
    columns.extend(family.column_names());

    let mut values = Vec::with_capacity(columns.len());
    values.push(Some(FieldValue::Integer(block.slot as i64)));
    values.extend_from_slice(context);
    values.extend(block.values.iter().cloned());

    repository::upsert_row(conn, family.table, &columns, &values)
}

const CHECK_COLUMNS: [&str; 6] = [
    "conversationid",
    "dialogueid",
    "checktype",
    "skilltype",
    "check_target",
    "difficulty",
];

/// Write every check of an entry; returns how many rows were written.
pub fn insert_checks(
    conn: &Connection,
    conversation_id: i64,
    dialogue_id: i64,
    entry_checks: &EntryChecks,
) -> Result<usize, DatabaseError> {
    for check in &entry_checks.checks {
        let values = [
            Some(FieldValue::Integer(conversation_id)),
            Some(FieldValue::Integer(dialogue_id)),
            Some(FieldValue::from(check.check_type.as_str())),
            entry_checks.skill_type.clone(),
            entry_checks.check_target.clone(),
            Some(FieldValue::Real(check.difficulty)),
        ];
        repository::upsert_row(conn, "checks", &CHECK_COLUMNS, &values)?;
    }
    Ok(entry_checks.checks.len())
}
