//! Issue-type field metadata as returned by Jira's create-meta endpoint.

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field key to field configuration for one project + issue type, in document order.
pub type IssueTypeSchema = IndexMap<String, FieldConfig>;

/// Represents the create-screen configuration of one field: display name, whether Jira requires it, the options it accepts and its type schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<AllowedValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldSchema>,
}

impl FieldConfig {
    /// Allowed values, or an empty slice when Jira sent none.
    pub fn options(&self) -> &[AllowedValue] {
        self.allowed_values.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl FieldSchema {
    pub fn is_type(&self, expected: &str) -> bool {
        self.field_type.eq_ignore_ascii_case(expected)
    }

    pub fn is_array(&self) -> bool {
        self.is_type("array")
    }
}

/// Schema fixtures for unit tests.
#[cfg(test)]
impl FieldSchema {
    pub(crate) fn new(field_type: &str) -> Self {
        Self {
            field_type: field_type.to_string(),
            items: None,
            system: None,
            custom: None,
        }
    }

    pub(crate) fn array_of(items: &str) -> Self {
        Self {
            items: Some(items.to_string()),
            ..Self::new("array")
        }
    }
}

/// One selectable option of a field. Jira labels options with either `name` (priorities, issue types) or `value` (custom selects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AllowedValue {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.value.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Jira ids are strings, but some proxies hand them back as numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
