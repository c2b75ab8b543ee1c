//! Field lookup and value coercion over an entity's `{title, value}` list.
//!
//! Every "no value" shape in the export (missing title, JSON null, blank
//! string, the literal `""`) collapses to `None` here, so nothing downstream
//! has to tell them apart.

use serde_json::Value;

use crate::models::{whole_number, Field, FieldValue};

/// Normalize a raw JSON scalar.
///
/// `"True"`/`"False"` become booleans; blank strings and `""` become `None`.
pub fn normalize(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(FieldValue::Integer(i)),
            None => n.as_f64().map(FieldValue::Real),
        },
        Value::String(s) => match s.as_str() {
            "True" => Some(FieldValue::Bool(true)),
            "False" => Some(FieldValue::Bool(false)),
            _ if is_blank(s) => None,
            _ => Some(FieldValue::Text(s.clone())),
        },
        other => Some(FieldValue::Text(other.to_string())),
    }
}

fn is_blank(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || trimmed == "\"\""
}

/// Value of the first field whose title matches exactly.
///
/// Only the first match is considered, even when its value is blank.
pub fn get_field(fields: &[Field], title: &str) -> Option<FieldValue> {
    fields
        .iter()
        .find(|field| field.title == title)
        .and_then(|field| normalize(&field.value))
}

/// First real value among `titles`, tried in order.
pub fn coalesce(fields: &[Field], titles: &[&str]) -> Option<FieldValue> {
    titles.iter().find_map(|title| get_field(fields, title))
}

/// Field value rendered as a string, whatever its kind.
pub fn get_text(fields: &[Field], title: &str) -> Option<String> {
    get_field(fields, title).map(|value| value.to_string())
}

/// Boolean coercion. Strings are true for `true`/`1`/`yes` in any case.
pub fn to_bool(value: Option<FieldValue>) -> Option<bool> {
    value.map(|v| match v {
        FieldValue::Bool(b) => b,
        FieldValue::Text(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"),
        FieldValue::Integer(i) => i != 0,
        FieldValue::Real(f) => f != 0.0,
    })
}

/// Numeric coercion. Unparseable input yields `None`.
pub fn to_number(value: Option<FieldValue>) -> Option<f64> {
    value.and_then(|v| match v {
        FieldValue::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        FieldValue::Integer(i) => Some(i as f64),
        FieldValue::Real(f) => Some(f),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
    })
}

/// Reference coercion: a number that is a whole `i64`, else `None`.
pub fn to_id(value: Option<FieldValue>) -> Option<i64> {
    match value? {
        FieldValue::Bool(_) => None,
        other => to_number(Some(other)).and_then(whole_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<Field> {
        vec![
            Field::new("Name", "Kim Kitsuragi"),
            Field::new("Name", "Shadowed"),
            Field::new("Blank", "   "),
            Field::new("Quoted", "\"\""),
            Field::new("Null", Value::Null),
            Field::new("Flag", "True"),
            Field::new("Off", "False"),
            Field::new("Count", 12),
            Field::new("Ratio", 0.5),
            Field::new("description", ""),
            Field::new("Description", "Lieutenant"),
        ]
    }

    #[test]
    fn get_field_returns_first_match() {
        assert_eq!(
            get_field(&fields(), "Name"),
            Some(FieldValue::Text("Kim Kitsuragi".into()))
        );
    }

    #[test]
    fn get_field_is_case_sensitive() {
        assert_eq!(get_field(&fields(), "name"), None);
    }

    #[test]
    fn absent_shapes_collapse_to_none() {
        let f = fields();
        assert_eq!(get_field(&f, "Missing"), None);
        assert_eq!(get_field(&f, "Blank"), None);
        assert_eq!(get_field(&f, "Quoted"), None);
        assert_eq!(get_field(&f, "Null"), None);
    }

    #[test]
    fn boolean_strings_become_booleans() {
        let f = fields();
        assert_eq!(get_field(&f, "Flag"), Some(FieldValue::Bool(true)));
        assert_eq!(get_field(&f, "Off"), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn numbers_keep_their_kind() {
        let f = fields();
        assert_eq!(get_field(&f, "Count"), Some(FieldValue::Integer(12)));
        assert_eq!(get_field(&f, "Ratio"), Some(FieldValue::Real(0.5)));
    }

    #[test]
    fn coalesce_skips_blank_candidates() {
        assert_eq!(
            coalesce(&fields(), &["description", "Description"]),
            Some(FieldValue::Text("Lieutenant".into()))
        );
        assert_eq!(coalesce(&fields(), &["Missing", "Blank"]), None);
    }

    #[test]
    fn coalesce_single_title_matches_get_field() {
        let f = fields();
        for title in ["Name", "Blank", "Flag", "Missing"] {
            assert_eq!(coalesce(&f, &[title]), get_field(&f, title));
        }
    }

    #[test]
    fn to_bool_rules() {
        assert_eq!(to_bool(None), None);
        assert_eq!(to_bool(Some("YES".into())), Some(true));
        assert_eq!(to_bool(Some("1".into())), Some(true));
        assert_eq!(to_bool(Some("no".into())), Some(false));
        assert_eq!(to_bool(Some(true.into())), Some(true));
        assert_eq!(to_bool(Some(0_i64.into())), Some(false));
        assert_eq!(to_bool(Some(2_i64.into())), Some(true));
    }

    #[test]
    fn to_number_rules() {
        assert_eq!(to_number(Some("3.5".into())), Some(3.5));
        assert_eq!(to_number(Some(" 7 ".into())), Some(7.0));
        assert_eq!(to_number(Some("abc".into())), None);
        assert_eq!(to_number(None), None);
        assert_eq!(to_number(Some(4_i64.into())), Some(4.0));
    }

    #[test]
    fn to_id_rules() {
        assert_eq!(to_id(Some("7".into())), Some(7));
        assert_eq!(to_id(Some(12.0.into())), Some(12));
        assert_eq!(to_id(Some("1.5".into())), None);
        assert_eq!(to_id(Some("1e30".into())), None);
        assert_eq!(to_id(Some("NaN".into())), None);
        assert_eq!(to_id(Some(true.into())), None);
        assert_eq!(to_id(None), None);
    }

    #[test]
    fn coercers_are_idempotent() {
        let once = to_bool(Some("yes".into()));
        assert_eq!(to_bool(once.map(FieldValue::Bool)), once);

        let once = to_number(Some("2.25".into()));
        assert_eq!(to_number(once.map(FieldValue::Real)), once);
    }

    #[test]
    fn structured_values_are_kept_as_text() {
        assert_eq!(
            normalize(&json!([1, 2])),
            Some(FieldValue::Text("[1,2]".into()))
        );
    }
}
