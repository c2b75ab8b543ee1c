//! Numbered field families expanded into child rows.
//!
//! A family such as `Condition1..Condition4` / `Alternate1..Alternate4` is
//! described once as a [`BlockFamily`]; [`BlockFamily::expand`] walks the
//! slots and keeps the ones holding at least one real value. Empty slots are
//! skipped, never renumbered.

use crate::models::{Cell, CheckType, Field, FieldValue};

use super::fields::{get_field, to_bool, to_number};

/// How a slot field is coerced before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Raw,
    Bool,
    Number,
}

/// One templated field inside a family. `{n}` is replaced with the slot
/// number, `{nn}` with the slot number zero-padded to two digits.
pub struct SlotColumn {
    pub column: &'static str,
    pub template: &'static str,
    pub coercion: Coercion,
    /// Whether a real value here is enough for the slot to be emitted.
    pub marks_presence: bool,
}

pub struct BlockFamily {
    pub table: &'static str,
    pub slots: usize,
    /// Columns filled from the parent, in the order the caller supplies them.
    pub context: &'static [&'static str],
    pub columns: &'static [SlotColumn],
}

/// One emitted slot: its 1-based index and the family column values.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBlock {
    pub slot: usize,
    pub values: Vec<Cell>,
}

pub fn slot_field_name(template: &str, slot: usize) -> String {
    template
        .replace("{nn}", &format!("{slot:02}"))
        .replace("{n}", &slot.to_string())
}

impl BlockFamily {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.column).collect()
    }

    /// Extract every slot in `1..=slots`, keeping those with a real value in
    /// at least one presence column.
    pub fn expand(&self, fields: &[Field]) -> Vec<SlotBlock> {
        (1..=self.slots)
            .filter_map(|slot| {
                let values: Vec<Cell> = self
                    .columns
                    .iter()
                    .map(|col| {
                        let raw = get_field(fields, &slot_field_name(col.template, slot));
                        coerce(raw, col.coercion)
                    })
                    .collect();

                let present = self
                    .columns
                    .iter()
                    .zip(&values)
                    .any(|(col, value)| col.marks_presence && value.is_some());

                present.then_some(SlotBlock { slot, values })
            })
            .collect()
    }
}

fn coerce(value: Option<FieldValue>, coercion: Coercion) -> Cell {
    match coercion {
        Coercion::Raw => value,
        Coercion::Bool => to_bool(value).map(FieldValue::Bool),
        Coercion::Number => to_number(value).map(FieldValue::Real),
    }
}

pub static SUBTASKS: BlockFamily = BlockFamily {
    table: "subtasks",
    slots: 12,
    context: &["conversationid"],
    columns: &[
        SlotColumn { column: "name", template: "subtask_title_{nn}", coercion: Coercion::Raw, marks_presence: true },
        SlotColumn { column: "isTimed", template: "timed_subtask_{nn}", coercion: Coercion::Bool, marks_presence: false },
        SlotColumn { column: "displayCondition", template: "display_subtask_{nn}", coercion: Coercion::Raw, marks_presence: true },
        SlotColumn { column: "doneCondition", template: "done_subtask_{nn}", coercion: Coercion::Raw, marks_presence: true },
        SlotColumn { column: "cancelCondition", template: "cancel_subtask_{nn}", coercion: Coercion::Raw, marks_presence: true },
    ],
};

/// Alternate lines. The entry's own dialogue text rides along as `replaces`.
pub static ALTERNATES: BlockFamily = BlockFamily {
    table: "alternates",
    slots: 4,
    context: &["conversationid", "dialogueid", "replaces"],
    columns: &[
        SlotColumn { column: "alternateline", template: "Alternate{n}", coercion: Coercion::Raw, marks_presence: true },
        SlotColumn { column: "condition", template: "Condition{n}", coercion: Coercion::Raw, marks_presence: true },
    ],
};

pub static MODIFIERS: BlockFamily = BlockFamily {
    table: "modifiers",
    slots: 10,
    context: &["conversationid", "dialogueid"],
    columns: &[
        SlotColumn { column: "modifier", template: "modifier{n}", coercion: Coercion::Number, marks_presence: true },
        SlotColumn { column: "variable", template: "variable{n}", coercion: Coercion::Raw, marks_presence: true },
        SlotColumn { column: "tooltip", template: "tooltip{n}", coercion: Coercion::Raw, marks_presence: true },
    ],
};

/// Difficulty field that produces each kind of skill check.
pub const CHECK_DIFFICULTIES: [(CheckType, &str); 3] = [
    (CheckType::Passive, "DifficultyPass"),
    (CheckType::White, "DifficultyWhite"),
    (CheckType::Red, "DifficultyRed"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CheckBlock {
    pub check_type: CheckType,
    pub difficulty: f64,
}

/// Checks of one dialogue entry plus the fields every check shares.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChecks {
    pub skill_type: Cell,
    pub check_target: Cell,
    pub checks: Vec<CheckBlock>,
}

/// Each difficulty field is evaluated independently, so an entry yields
/// zero to three checks.
pub fn expand_checks(fields: &[Field]) -> EntryChecks {
    let checks = CHECK_DIFFICULTIES
        .iter()
        .filter_map(|(check_type, title)| {
            to_number(get_field(fields, title)).map(|difficulty| CheckBlock {
                check_type: *check_type,
                difficulty,
            })
        })
        .collect();

    EntryChecks {
        skill_type: get_field(fields, "SkillType"),
        check_target: get_field(fields, "check_target"),
        checks,
    }
}
