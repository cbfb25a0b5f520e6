//! Profile record returned by the backend after creation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::draft::ProfileKind;

/// A created organizer or player profile.
///
/// The backend echoes the submitted fields next to the new id; those are
/// kept verbatim in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "profileId", alias = "id", deserialize_with = "id_from_string_or_number")]
    pub id: String,

    #[serde(default)]
    pub kind: Option<ProfileKind>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Profile {
    /// Echoed string field, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "profileId must be a string or number, got {}",
            other
        ))),
    }
}
