//! Pipeline orchestrator.
//!
//! Drives a build as a linear state machine:
//! schema → actors → items → variables → conversations → entries →
//! titles → aggregates. Every phase runs inside its own transaction; a failing
//! phase rolls back, moves the run to `Failed` and skips everything after it,
//! while earlier commits stay in place.

use std::borrow::Cow;
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use super::aggregate;
use super::blocks::{expand_checks, ALTERNATES, MODIFIERS, SUBTASKS};
use super::classify::{classify_conversation, display_title, is_hidden};
use super::fields::{get_field, get_text};
use super::mapper::{
    EntityMapper, ACTOR_MAPPER, CONVERSATION_MAPPER, DIALOGUE_ENTRY_MAPPER, ITEM_MAPPER,
    OUTGOING_LINK_MAPPER, VARIABLE_MAPPER,
};
use super::store::{insert_checks, insert_slot_block, upsert_entity, upsert_entity_with};
use super::PipelineError;
use crate::config::PipelineConfig;
use crate::db::{repository, sqlite};
use crate::models::{
    CheckType, Conversation, ConversationType, FieldValue, SourceDocument, SourceEntity,
};

// ---------------------------------------------------------------------------
// States and phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Init,
    SchemaApplied,
    ActorsLoaded,
    ItemsLoaded,
    VariablesLoaded,
    ConversationsLoaded,
    EntriesLoaded,
    TitlesBackfilled,
    Aggregated,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// One transactional unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Schema,
    Actors,
    Items,
    Variables,
    Conversations,
    Entries,
    Titles,
    Aggregates,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Schema,
        Phase::Actors,
        Phase::Items,
        Phase::Variables,
        Phase::Conversations,
        Phase::Entries,
        Phase::Titles,
        Phase::Aggregates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Actors => "actors",
            Self::Items => "items",
            Self::Variables => "variables",
            Self::Conversations => "conversations",
            Self::Entries => "entries",
            Self::Titles => "titles",
            Self::Aggregates => "aggregates",
        }
    }

    /// State reached once this phase commits.
    pub fn completes(&self) -> PipelineState {
        match self {
            Self::Schema => PipelineState::SchemaApplied,
            Self::Actors => PipelineState::ActorsLoaded,
            Self::Items => PipelineState::ItemsLoaded,
            Self::Variables => PipelineState::VariablesLoaded,
            Self::Conversations => PipelineState::ConversationsLoaded,
            Self::Entries => PipelineState::EntriesLoaded,
            Self::Titles => PipelineState::TitlesBackfilled,
            Self::Aggregates => PipelineState::Aggregated,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaCounts {
    pub tables_dropped: usize,
    pub statements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationCounts {
    pub conversations: usize,
    pub tasks: usize,
    pub orbs: usize,
    pub hidden: usize,
    pub subtasks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryCounts {
    pub entries: usize,
    pub alternates: usize,
    pub modifiers: usize,
    pub links: usize,
    pub passive_checks: usize,
    pub white_checks: usize,
    pub red_checks: usize,
}

impl EntryCounts {
    fn record_check(&mut self, check_type: CheckType) {
        match check_type {
            CheckType::Passive => self.passive_checks += 1,
            CheckType::White => self.white_checks += 1,
            CheckType::Red => self.red_checks += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateCounts {
    pub talkative_actors: usize,
    pub counted_conversations: usize,
}

/// Counters gathered phase by phase over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub schema: SchemaCounts,
    pub actors: usize,
    pub items: usize,
    pub variables: usize,
    pub conversations: ConversationCounts,
    pub entries: EntryCounts,
    pub titles_backfilled: usize,
    pub aggregates: AggregateCounts,
}

/// Final result of a run. The connection has been released by the time this
/// is returned.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub state: PipelineState,
    /// Every state entered, starting with `Init`.
    pub history: Vec<PipelineState>,
    pub report: RunReport,
    /// Phase and error message of the failure, if any.
    pub failure: Option<String>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Done
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owns the connection and the loaded document for the duration of a run.
pub struct Pipeline {
    conn: Connection,
    document: SourceDocument,
    schema: Vec<String>,
    state: PipelineState,
    history: Vec<PipelineState>,
    report: RunReport,
}

impl Pipeline {
    pub fn new(conn: Connection, document: SourceDocument, schema: Vec<String>) -> Self {
        Self {
            conn,
            document,
            schema,
            state: PipelineState::Init,
            history: vec![PipelineState::Init],
            report: RunReport::default(),
        }
    }

    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "State transition");
        self.state = next;
        self.history.push(next);
    }

    /// Run every phase in order, then release the connection.
    pub fn run(mut self) -> RunOutcome {
        let mut failure = None;

        for phase in Phase::ALL {
            tracing::info!(phase = phase.as_str(), "Starting phase");
            match self.run_phase(phase) {
                Ok(()) => self.advance(phase.completes()),
                Err(e) => {
                    tracing::error!(
                        phase = phase.as_str(),
                        error = %e,
                        "Phase failed; remaining phases skipped"
                    );
                    failure = Some(e.to_string());
                    self.advance(PipelineState::Failed);
                    break;
                }
            }
        }

        if !self.state.is_terminal() {
            self.advance(PipelineState::Done);
            tracing::info!("Database build complete");
        }

        if let Err((_, e)) = self.conn.close() {
            tracing::warn!("Failed to close database cleanly: {e}");
        }

        RunOutcome {
            state: self.state,
            history: self.history,
            report: self.report,
            failure,
        }
    }

    fn run_phase(&mut self, phase: Phase) -> Result<(), PipelineError> {
        let conn = &self.conn;
        let document = &self.document;
        let schema = &self.schema;
        let report = &mut self.report;

        match phase {
            Phase::Schema => {
                report.schema = in_transaction(conn, phase, |tx| {
                    let tables_dropped = sqlite::drop_all_tables(tx)?.len();
                    let statements = sqlite::apply_schema(tx, schema)?;
                    Ok(SchemaCounts { tables_dropped, statements })
                })?;
                tracing::info!(
                    dropped = report.schema.tables_dropped,
                    statements = report.schema.statements,
                    "Schema applied"
                );
            }
            Phase::Actors => {
                report.actors = in_transaction(conn, phase, |tx| {
                    load_entities(tx, &ACTOR_MAPPER, &document.actors)
                })?;
                tracing::info!(count = report.actors, "Actors loaded");
            }
            Phase::Items => {
                report.items = in_transaction(conn, phase, |tx| {
                    load_entities(tx, &ITEM_MAPPER, &document.items)
                })?;
                tracing::info!(count = report.items, "Items loaded");
            }
            Phase::Variables => {
                report.variables = in_transaction(conn, phase, |tx| {
                    load_entities(tx, &VARIABLE_MAPPER, &document.variables)
                })?;
                tracing::info!(count = report.variables, "Variables loaded");
            }
            Phase::Conversations => {
                let counts = in_transaction(conn, phase, |tx| {
                    load_conversations(tx, &document.conversations)
                })?;
                tracing::info!(
                    count = counts.conversations,
                    tasks = counts.tasks,
                    orbs = counts.orbs,
                    hidden = counts.hidden,
                    subtasks = counts.subtasks,
                    "Conversations loaded"
                );
                report.conversations = counts;
            }
            Phase::Entries => {
                let counts = in_transaction(conn, phase, |tx| {
                    load_entries(tx, &document.conversations)
                })?;
                tracing::info!(
                    count = counts.entries,
                    alternates = counts.alternates,
                    modifiers = counts.modifiers,
                    links = counts.links,
                    passive = counts.passive_checks,
                    white = counts.white_checks,
                    red = counts.red_checks,
                    "Dialogue entries loaded"
                );
                report.entries = counts;
            }
            Phase::Titles => {
                report.titles_backfilled = in_transaction(conn, phase, |tx| {
                    Ok(aggregate::backfill_entry_titles(tx)?)
                })?;
                tracing::info!(count = report.titles_backfilled, "Entry titles backfilled");
            }
            Phase::Aggregates => {
                report.aggregates = in_transaction(conn, phase, |tx| {
                    Ok(AggregateCounts {
                        talkative_actors: aggregate::compute_talkativeness(tx)?,
                        counted_conversations: aggregate::compute_entry_counts(tx)?,
                    })
                })?;
                tracing::info!(
                    actors = report.aggregates.talkative_actors,
                    conversations = report.aggregates.counted_conversations,
                    "Aggregates computed"
                );
            }
        }
        Ok(())
    }
}

/// Run `work` inside a transaction. Commits on success; on error the
/// transaction is dropped, which rolls back everything `work` wrote.
fn in_transaction<T>(
    conn: &Connection,
    phase: Phase,
    work: impl FnOnce(&Connection) -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let tx = conn.unchecked_transaction()?;
    match work(&*tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            drop(tx);
            tracing::warn!(phase = phase.as_str(), "Phase rolled back");
            Err(PipelineError::PhaseFailed {
                phase: phase.as_str(),
                reason: e.to_string(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Phase bodies
// ---------------------------------------------------------------------------

fn load_entities<E: SourceEntity>(
    conn: &Connection,
    mapper: &EntityMapper<E>,
    entities: &[E],
) -> Result<usize, PipelineError> {
    for entity in entities {
        upsert_entity(conn, mapper, entity)?;
    }
    Ok(entities.len())
}

fn load_conversations(
    conn: &Connection,
    conversations: &[Conversation],
) -> Result<ConversationCounts, PipelineError> {
    let mut counts = ConversationCounts::default();

    for conversation in conversations {
        let fields = &conversation.fields;
        let conversation_type = classify_conversation(fields);
        let title = get_text(fields, "Title");
        let description = get_text(fields, "Description");
        let hidden = is_hidden(title.as_deref(), description.as_deref());
        let subtasks = SUBTASKS.expand(fields);

        upsert_entity_with(
            conn,
            &CONVERSATION_MAPPER,
            conversation,
            &[
                ("type", Some(FieldValue::from(conversation_type.as_str()))),
                ("totalSubtasks", Some(FieldValue::Integer(subtasks.len() as i64))),
                (
                    "displayTitle",
                    Some(FieldValue::from(display_title(title.as_deref(), conversation_type))),
                ),
                ("isHidden", Some(FieldValue::Bool(hidden))),
            ],
        )?;

        let context = [Some(FieldValue::Integer(conversation.id))];
        for block in &subtasks {
            insert_slot_block(conn, &SUBTASKS, &context, block)?;
        }

        counts.conversations += 1;
        counts.subtasks += subtasks.len();
        counts.hidden += usize::from(hidden);
        match conversation_type {
            ConversationType::Task => counts.tasks += 1,
            ConversationType::Orb => counts.orbs += 1,
            ConversationType::Flow => {}
        }
    }

    Ok(counts)
}

fn load_entries(
    conn: &Connection,
    conversations: &[Conversation],
) -> Result<EntryCounts, PipelineError> {
    let mut counts = EntryCounts::default();

    for conversation in conversations {
        for entry in &conversation.dialogue_entries {
            // Entries without their own conversation id inherit the parent's.
            let entry = match entry.conversation_id {
                Some(_) => Cow::Borrowed(entry),
                None => {
                    let mut owned = entry.clone();
                    owned.conversation_id = Some(conversation.id);
                    Cow::Owned(owned)
                }
            };
            let conversation_id = entry.conversation_id.unwrap_or(conversation.id);
            let fields = &entry.fields;

            upsert_entity(conn, &DIALOGUE_ENTRY_MAPPER, &*entry)?;

            let keys = [
                Some(FieldValue::Integer(conversation_id)),
                Some(FieldValue::Integer(entry.id)),
            ];

            let alternates = ALTERNATES.expand(fields);
            let alternate_context = [
                keys[0].clone(),
                keys[1].clone(),
                get_field(fields, "Dialogue Text"),
            ];
            for block in &alternates {
                insert_slot_block(conn, &ALTERNATES, &alternate_context, block)?;
            }

            let modifiers = MODIFIERS.expand(fields);
            for block in &modifiers {
                insert_slot_block(conn, &MODIFIERS, &keys, block)?;
            }

            let checks = expand_checks(fields);
            insert_checks(conn, conversation_id, entry.id, &checks)?;
            for check in &checks.checks {
                counts.record_check(check.check_type);
            }

            repository::update_entry_flags(
                conn,
                conversation_id,
                entry.id,
                !alternates.is_empty(),
                !checks.checks.is_empty(),
                modifiers.len(),
            )?;

            for link in &entry.outgoing_links {
                upsert_entity(conn, &OUTGOING_LINK_MAPPER, link)?;
            }

            counts.entries += 1;
            counts.alternates += alternates.len();
            counts.modifiers += modifiers.len();
            counts.links += entry.outgoing_links.len();
        }
    }

    Ok(counts)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Read and parse the export document.
pub fn load_document(path: &Path) -> Result<SourceDocument, PipelineError> {
    let raw = std::fs::read_to_string(path)?;
    let document: SourceDocument = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %path.display(),
        actors = document.actors.len(),
        items = document.items.len(),
        variables = document.variables.len(),
        conversations = document.conversations.len(),
        "Loaded export document"
    );
    Ok(document)
}

/// Load the input, open the output database and run every phase.
///
/// Errors here are input or setup failures that happen before any phase
/// starts; phase failures are reported through the returned outcome.
pub fn build_database(config: &PipelineConfig) -> Result<RunOutcome, PipelineError> {
    let document = load_document(&config.input_path)?;
    let schema = config.schema.statements()?;
    let conn = sqlite::open_database(&config.database_path)?;
    Ok(Pipeline::new(conn, document, schema).run())
}
