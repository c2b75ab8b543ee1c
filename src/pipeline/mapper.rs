//! Entity mappers: per-table ordered lists of `column → extractor`.
//!
//! Extractors are plain function pointers over `(entity, fields)`; they never
//! see pipeline state, so a row depends only on its source entity.

use crate::models::{
    Actor, Cell, Conversation, DialogueEntry, Field, FieldValue, Item, OutgoingLink,
    SourceEntity, Variable,
};

use super::fields::{coalesce, get_field, normalize, to_bool, to_id, to_number};

pub type Extractor<E> = fn(&E, &[Field]) -> Cell;

/// One output column and the rule that fills it.
pub struct ColumnRule<E: 'static> {
    pub column: &'static str,
    pub extract: Extractor<E>,
}

/// Declarative row builder for one source entity type.
pub struct EntityMapper<E: 'static> {
    pub table: &'static str,
    pub columns: &'static [ColumnRule<E>],
}

impl<E: SourceEntity> EntityMapper<E> {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|rule| rule.column).collect()
    }

    /// Evaluate every extractor in declaration order.
    pub fn row(&self, entity: &E) -> Vec<Cell> {
        let fields = entity.fields();
        self.columns
            .iter()
            .map(|rule| (rule.extract)(entity, fields))
            .collect()
    }
}

fn id(value: i64) -> Cell {
    Some(FieldValue::Integer(value))
}

fn opt_id(value: Option<i64>) -> Cell {
    value.map(FieldValue::Integer)
}

fn text(fields: &[Field], title: &str) -> Cell {
    get_field(fields, title)
}

fn number(fields: &[Field], title: &str) -> Cell {
    to_number(get_field(fields, title)).map(FieldValue::Real)
}

fn boolean(fields: &[Field], title: &str) -> Cell {
    to_bool(get_field(fields, title)).map(FieldValue::Bool)
}

/// Id of another entity; anything that is not a whole number is dropped.
fn reference(fields: &[Field], title: &str) -> Cell {
    to_id(get_field(fields, title)).map(FieldValue::Integer)
}

pub static ACTOR_MAPPER: EntityMapper<Actor> = EntityMapper {
    table: "actors",
    columns: &[
        ColumnRule { column: "id", extract: |a, _| id(a.id) },
        ColumnRule { column: "name", extract: |_, f| text(f, "Name") },
        ColumnRule { column: "description", extract: |_, f| text(f, "Description") },
        ColumnRule { column: "characterShortName", extract: |_, f| text(f, "character_short_name") },
        ColumnRule { column: "shortDescription", extract: |_, f| text(f, "short_description") },
        ColumnRule { column: "longDescription", extract: |_, f| text(f, "LongDescription") },
        ColumnRule { column: "color", extract: |_, f| number(f, "color") },
        ColumnRule { column: "articyId", extract: |_, f| text(f, "Articy Id") },
        ColumnRule { column: "pictures", extract: |_, f| text(f, "Pictures") },
        ColumnRule { column: "isFemale", extract: |_, f| boolean(f, "IsFemale") },
        ColumnRule { column: "talkativeness", extract: |_, f| number(f, "Talkativeness") },
    ],
};

pub static ITEM_MAPPER: EntityMapper<Item> = EntityMapper {
    table: "items",
    columns: &[
        ColumnRule { column: "id", extract: |i, _| id(i.id) },
        ColumnRule { column: "name", extract: |_, f| text(f, "Name") },
        ColumnRule { column: "description", extract: |_, f| coalesce(f, &["description", "Description"]) },
        ColumnRule { column: "characterShortName", extract: |_, f| text(f, "character_short_name") },
        ColumnRule {
            column: "isCursed",
            extract: |_, f| to_bool(coalesce(f, &["Cursed", "cursed"])).map(FieldValue::Bool),
        },
        ColumnRule { column: "fixtureBonus", extract: |_, f| text(f, "fixtureBonus") },
        ColumnRule { column: "requirement", extract: |_, f| text(f, "requirement") },
        ColumnRule { column: "bonus", extract: |_, f| text(f, "bonus") },
        ColumnRule { column: "thoughtType", extract: |_, f| text(f, "thoughtType") },
        ColumnRule { column: "isThought", extract: |_, f| boolean(f, "isThought") },
        ColumnRule { column: "fixtureDescription", extract: |_, f| text(f, "fixtureDescription") },
        ColumnRule { column: "autoequip", extract: |_, f| boolean(f, "autoequip") },
        ColumnRule { column: "itemType", extract: |_, f| number(f, "itemType") },
        ColumnRule { column: "conversation", extract: |_, f| text(f, "conversation") },
        ColumnRule { column: "timeLeft", extract: |_, f| number(f, "timeLeft") },
        ColumnRule { column: "isSubstance", extract: |_, f| boolean(f, "isSubstance") },
        ColumnRule { column: "stackName", extract: |_, f| text(f, "stackName") },
        ColumnRule { column: "sound", extract: |_, f| number(f, "sound") },
        ColumnRule { column: "isConsumable", extract: |_, f| boolean(f, "isConsumable") },
        ColumnRule { column: "itemGroup", extract: |_, f| number(f, "itemGroup") },
        ColumnRule { column: "equipOrb", extract: |_, f| text(f, "equipOrb") },
        ColumnRule { column: "itemValue", extract: |_, f| number(f, "itemValue") },
        ColumnRule { column: "mediumTextValue", extract: |_, f| text(f, "MediumTextValue") },
        ColumnRule { column: "multipleAllowed", extract: |_, f| boolean(f, "multipleAllowed") },
        ColumnRule { column: "articyId", extract: |_, f| text(f, "Articy Id") },
    ],
};

pub static VARIABLE_MAPPER: EntityMapper<Variable> = EntityMapper {
    table: "variables",
    columns: &[
        ColumnRule { column: "id", extract: |v, _| id(v.id) },
        ColumnRule { column: "name", extract: |_, f| text(f, "Name") },
        ColumnRule { column: "initialvalue", extract: |_, f| text(f, "Initial Value") },
        ColumnRule { column: "description", extract: |_, f| text(f, "Description") },
    ],
};

/// Plain conversation columns. The conversation pass appends the classified
/// `type`, `totalSubtasks`, `displayTitle` and `isHidden` after these.
pub static CONVERSATION_MAPPER: EntityMapper<Conversation> = EntityMapper {
    table: "conversations",
    columns: &[
        ColumnRule { column: "id", extract: |c, _| id(c.id) },
        ColumnRule { column: "title", extract: |_, f| text(f, "Title") },
        ColumnRule { column: "articyId", extract: |_, f| text(f, "Articy Id") },
        ColumnRule { column: "onUse", extract: |_, f| text(f, "OnUse") },
        ColumnRule {
            column: "overrideDialogueCondition",
            extract: |_, f| text(f, "OverrideDialogueCondition"),
        },
        ColumnRule { column: "alternateOrbText", extract: |_, f| text(f, "AlternateOrbText") },
        ColumnRule { column: "checkType", extract: |_, f| text(f, "CheckType") },
        ColumnRule { column: "condition", extract: |_, f| text(f, "Condition") },
        ColumnRule { column: "instruction", extract: |_, f| text(f, "Instruction") },
        ColumnRule { column: "placement", extract: |_, f| text(f, "Placement") },
        ColumnRule { column: "difficulty", extract: |_, f| text(f, "Difficulty") },
        ColumnRule { column: "description", extract: |_, f| text(f, "Description") },
        ColumnRule { column: "actor", extract: |_, f| reference(f, "Actor") },
        ColumnRule { column: "conversant", extract: |_, f| reference(f, "Conversant") },
        ColumnRule { column: "displayConditionMain", extract: |_, f| text(f, "display_condition_main") },
        ColumnRule { column: "doneConditionMain", extract: |_, f| text(f, "done_condition_main") },
        ColumnRule { column: "cancelConditionMain", extract: |_, f| text(f, "cancel_condition_main") },
        ColumnRule { column: "taskReward", extract: |_, f| text(f, "task_reward") },
        ColumnRule { column: "taskTimed", extract: |_, f| boolean(f, "task_timed") },
    ],
};

pub static DIALOGUE_ENTRY_MAPPER: EntityMapper<DialogueEntry> = EntityMapper {
    table: "dentries",
    columns: &[
        ColumnRule { column: "id", extract: |e, _| id(e.id) },
        ColumnRule { column: "conversationid", extract: |e, _| opt_id(e.conversation_id) },
        ColumnRule { column: "title", extract: |_, f| text(f, "Title") },
        ColumnRule { column: "dialoguetext", extract: |_, f| text(f, "Dialogue Text") },
        ColumnRule { column: "articyId", extract: |_, f| text(f, "Articy Id") },
        ColumnRule { column: "sequence", extract: |_, f| text(f, "Sequence") },
        ColumnRule { column: "dialogueEntryType", extract: |_, f| text(f, "DialogueEntryType") },
        ColumnRule { column: "actor", extract: |_, f| reference(f, "Actor") },
        ColumnRule { column: "conversant", extract: |_, f| reference(f, "Conversant") },
        ColumnRule { column: "outputId", extract: |_, f| text(f, "OutputId") },
        ColumnRule { column: "inputId", extract: |_, f| text(f, "InputId") },
        ColumnRule { column: "forced", extract: |_, f| boolean(f, "Forced") },
        ColumnRule { column: "menuText", extract: |_, f| text(f, "Menu Text") },
        ColumnRule { column: "flagname", extract: |_, f| text(f, "FlagName") },
        ColumnRule {
            column: "isGroup",
            extract: |e, _| to_bool(normalize(&e.is_group)).map(FieldValue::Bool),
        },
        ColumnRule {
            column: "conditionstring",
            extract: |e, _| e.conditions_string.clone().map(FieldValue::Text),
        },
        ColumnRule {
            column: "userscript",
            extract: |e, _| e.user_script.clone().map(FieldValue::Text),
        },
    ],
};

pub static OUTGOING_LINK_MAPPER: EntityMapper<OutgoingLink> = EntityMapper {
    table: "dlinks",
    columns: &[
        ColumnRule { column: "originconversationid", extract: |l, _| opt_id(l.origin_conversation_id) },
        ColumnRule { column: "origindialogueid", extract: |l, _| opt_id(l.origin_dialogue_id) },
        ColumnRule {
            column: "destinationconversationid",
            extract: |l, _| opt_id(l.destination_conversation_id),
        },
        ColumnRule { column: "destinationdialogueid", extract: |l, _| opt_id(l.destination_dialogue_id) },
        ColumnRule {
            column: "isConnector",
            extract: |l, _| Some(FieldValue::Bool(to_bool(normalize(&l.is_connector)).unwrap_or(false))),
        },
        ColumnRule { column: "priority", extract: |l, _| id(l.priority.unwrap_or(2)) },
    ],
};
