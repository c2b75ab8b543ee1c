//! Conversation classification: type, display title and hidden flag.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ConversationType, Field};

use super::fields::get_field;

/// Fields whose presence makes a conversation a task.
const TASK_FIELDS: [&str; 5] = [
    "display_condition_main",
    "done_condition_main",
    "cancel_condition_main",
    "task_reward",
    "task_timed",
];

/// Title prefixes (upper-cased) of orb conversations that carry no placement.
const ORB_TITLE_PREFIXES: [&str; 3] = [
    "ARX - EASTEREGGS",
    "HELEN - EASTEREGGS",
    "LAIR ORB / FOOTPRINTS",
];

/// Never an orb, whatever else matches.
const ORB_EXCLUDED_PREFIX: &str = "BOARDWALK / PAYPHONE";

const TASK_TITLE_PREFIX: &str = "TASK / ";

static BARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bbarks?\b").unwrap());
static ORB_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\borb\b").unwrap());
static WCW_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bWCW\b").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Resolve a conversation's type. Task wins over orb, orb over flow.
pub fn classify_conversation(fields: &[Field]) -> ConversationType {
    if TASK_FIELDS.iter().any(|title| get_field(fields, title).is_some()) {
        return ConversationType::Task;
    }

    let title = get_field(fields, "Title").map(|t| t.to_string().to_uppercase());
    let has_placement = get_field(fields, "Placement").is_some();
    let marked_title = title
        .as_deref()
        .is_some_and(|t| ORB_TITLE_PREFIXES.iter().any(|prefix| t.starts_with(prefix)));
    let excluded = title
        .as_deref()
        .is_some_and(|t| t.starts_with(ORB_EXCLUDED_PREFIX));

    if (has_placement || marked_title) && !excluded {
        ConversationType::Orb
    } else {
        ConversationType::Flow
    }
}

/// Strip bark/orb markers, expand WCW and normalize whitespace.
pub fn clean_title(title: &str) -> String {
    let cleaned = BARK_PATTERN.replace_all(title, "");
    let cleaned = ORB_PATTERN.replace_all(&cleaned, "");
    let cleaned = WCW_PATTERN.replace_all(&cleaned, "WORKING CLASS WOMAN");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Browsable title: the cleaned title, prefixed for tasks.
pub fn display_title(title: Option<&str>, conversation_type: ConversationType) -> String {
    let cleaned = clean_title(title.unwrap_or_default());
    match conversation_type {
        ConversationType::Task => format!("{TASK_TITLE_PREFIX}{cleaned}"),
        _ => cleaned,
    }
}

/// Obsolete or to-be-deleted conversations are hidden from browsing.
pub fn is_hidden(title: Option<&str>, description: Option<&str>) -> bool {
    [title, description].into_iter().flatten().any(|text| {
        let lower = text.to_lowercase();
        lower.contains("obsolete") || lower.contains("delete")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<Field> {
        pairs.iter().map(|(t, v)| Field::new(*t, *v)).collect()
    }

    #[test]
    fn defaults_to_flow() {
        assert_eq!(
            classify_conversation(&fields(&[("Title", "WHIRLING / KIM INTRO")])),
            ConversationType::Flow
        );
    }

    #[test]
    fn any_task_field_makes_a_task() {
        for title in TASK_FIELDS {
            let f = fields(&[(title, "x")]);
            assert_eq!(classify_conversation(&f), ConversationType::Task, "{title}");
        }
    }

    #[test]
    fn false_task_timed_still_counts_as_set() {
        let f = fields(&[("task_timed", "False")]);
        assert_eq!(classify_conversation(&f), ConversationType::Task);
    }

    #[test]
    fn task_beats_orb() {
        let f = fields(&[("Placement", "Shack"), ("task_reward", "10 XP")]);
        assert_eq!(classify_conversation(&f), ConversationType::Task);
    }

    #[test]
    fn placement_makes_an_orb() {
        let f = fields(&[("Title", "MARTIN / CRATE"), ("Placement", "Crate")]);
        assert_eq!(classify_conversation(&f), ConversationType::Orb);
    }

    #[test]
    fn marker_title_makes_an_orb_case_insensitively() {
        let f = fields(&[("Title", "Helen - Eastereggs / Bench")]);
        assert_eq!(classify_conversation(&f), ConversationType::Orb);
    }

    #[test]
    fn payphone_is_never_an_orb() {
        let f = fields(&[("Title", "BOARDWALK / PAYPHONE - EASTEREGGS")]);
        assert_eq!(classify_conversation(&f), ConversationType::Flow);

        let f = fields(&[("Title", "BOARDWALK / PAYPHONE"), ("Placement", "Booth")]);
        assert_eq!(classify_conversation(&f), ConversationType::Flow);
    }

    #[test]
    fn blank_placement_is_ignored() {
        let f = fields(&[("Title", "PIER / BENCH"), ("Placement", "  ")]);
        assert_eq!(classify_conversation(&f), ConversationType::Flow);
    }

    #[test]
    fn cleanup_strips_barks_and_orbs() {
        assert_eq!(clean_title("Kineema barks"), "Kineema");
        assert_eq!(clean_title("BARK / Cuno"), "/ Cuno");
        assert_eq!(clean_title("shack orb door"), "shack door");
        assert_eq!(clean_title("Barkeep"), "Barkeep");
        assert_eq!(clean_title("Orbit"), "Orbit");
    }

    #[test]
    fn cleanup_expands_wcw() {
        assert_eq!(clean_title("WCW  /  window"), "WORKING CLASS WOMAN / window");
    }

    #[test]
    fn cleanup_is_idempotent() {
        for title in [
            "Lair Orb / Footprints bark test",
            "WCW barks   at orb",
            "  plain title ",
            "",
        ] {
            let once = clean_title(title);
            assert_eq!(clean_title(&once), once);
        }
    }

    #[test]
    fn task_titles_are_prefixed() {
        assert_eq!(
            display_title(Some("Lair Orb / Footprints bark test"), ConversationType::Task),
            "TASK / Lair Orb / Footprints test"
        );
        assert_eq!(display_title(None, ConversationType::Flow), "");
    }

    #[test]
    fn hidden_when_obsolete_or_deleted() {
        assert!(is_hidden(Some("OBSOLETE kim"), None));
        assert!(is_hidden(None, Some("please delete me")));
        assert!(is_hidden(Some("Undeleted"), Some("fine")));
        assert!(!is_hidden(Some("Kim"), Some("fine")));
        assert!(!is_hidden(None, None));
    }
}
