//! Serde model of the dialogue-database export.
//!
//! Only the attributes the database build reads are modelled; everything else
//! in the export (field types, canvas rects, node colors, ...) is ignored.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use super::value::whole_number;

/// Top-level export document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub actors: Vec<Actor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<Variable>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversations: Vec<Conversation>,
}

/// One `{title, value}` pair from an entity's field list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Field {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub value: Value,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Anything in the export that carries a field list.
pub trait SourceEntity {
    fn fields(&self) -> &[Field];
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variable {
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    #[serde(default, rename = "dialogueEntries", deserialize_with = "null_as_default")]
    pub dialogue_entries: Vec<DialogueEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialogueEntry {
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    #[serde(default, rename = "conversationID", deserialize_with = "flexible_id")]
    pub conversation_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    #[serde(default, rename = "isGroup")]
    pub is_group: Value,
    #[serde(default, rename = "conditionsString", deserialize_with = "flexible_string")]
    pub conditions_string: Option<String>,
    #[serde(default, rename = "userScript", deserialize_with = "flexible_string")]
    pub user_script: Option<String>,
    #[serde(default, rename = "outgoingLinks", deserialize_with = "null_as_default")]
    pub outgoing_links: Vec<OutgoingLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutgoingLink {
    #[serde(default, rename = "originConversationID", deserialize_with = "flexible_id")]
    pub origin_conversation_id: Option<i64>,
    #[serde(default, rename = "originDialogueID", deserialize_with = "flexible_id")]
    pub origin_dialogue_id: Option<i64>,
    #[serde(default, rename = "destinationConversationID", deserialize_with = "flexible_id")]
    pub destination_conversation_id: Option<i64>,
    #[serde(default, rename = "destinationDialogueID", deserialize_with = "flexible_id")]
    pub destination_dialogue_id: Option<i64>,
    #[serde(default, rename = "isConnector")]
    pub is_connector: Value,
    #[serde(default, deserialize_with = "flexible_id")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

/// Integer id from a JSON number or numeric string.
fn id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(whole_number),
        _ => None,
    }
}

/// Optional reference: anything that is not an integer id reads as `None`.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(id_from_value(&Value::deserialize(deserializer)?))
}

/// Entity key: accepts `5`, `5.0` or `"5"`, rejects anything else.
fn required_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an integer id, got {value}")))
}

/// Scalar rendered as text; `null` reads as `None`.
fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! impl_source_entity {
    ($($ty:ty),+ $(,)?) => {
        $(impl SourceEntity for $ty {
            fn fields(&self) -> &[Field] {
                &self.fields
            }
        })+
    };
}

impl_source_entity!(Actor, Item, Variable, Conversation, DialogueEntry, OutgoingLink);
