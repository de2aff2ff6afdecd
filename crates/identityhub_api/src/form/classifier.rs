//! Turns an issue type's field schema into the extra fields a ticket form must show.

use serde::Serialize;

use super::kind::FieldKind;
use super::{FieldValue, FormValues, IGNORED_FIELDS};
use crate::models::{AllowedValue, FieldSchema, IssueTypeSchema};

/// A required, non-base field annotated with how it can be filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedField {
    pub key: String,
    pub name: String,
    pub required: bool,
    pub allowed_values: Vec<AllowedValue>,
    pub schema: Option<FieldSchema>,
    pub kind: FieldKind,
}

impl ClassifiedField {
    pub fn is_supported(&self) -> bool {
        self.kind.is_supported()
    }

    pub fn is_array(&self) -> bool {
        self.schema.as_ref().is_some_and(FieldSchema::is_array)
    }

    /// Matches user input against an option id first, then its label (case-insensitive).
    pub fn resolve_option(&self, input: &str) -> Option<&AllowedValue> {
        let wanted = input.trim();
        self.allowed_values
            .iter()
            .find(|option| option.id == wanted)
            .or_else(|| {
                self.allowed_values
                    .iter()
                    .find(|option| option.label().eq_ignore_ascii_case(wanted))
            })
    }

    /// Initial value for a fresh form, or `None` for fields the form cannot fill.
    fn seed(&self) -> Option<FieldValue> {
        if !self.is_supported() {
            return None;
        }
        if let Some(first) = self.allowed_values.first() {
            return Some(FieldValue::Text(first.id.clone()));
        }
        if self.is_array() {
            return Some(FieldValue::List(Vec::new()));
        }
        Some(FieldValue::Text(String::new()))
    }
}

/// Classified fields in schema order plus the values a fresh form starts with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub fields: Vec<ClassifiedField>,
    pub seed: FormValues,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, key: &str) -> Option<&ClassifiedField> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn unsupported(&self) -> impl Iterator<Item = &ClassifiedField> {
        self.fields.iter().filter(|field| !field.is_supported())
    }

    /// True when a required field exists that only Jira itself can fill in.
    pub fn blocks_submission(&self) -> bool {
        self.fields
            .iter()
            .any(|field| field.required && !field.is_supported())
    }
}

/// Classifies every required field outside the base set, preserving schema order.
pub fn classify(schema: &IssueTypeSchema) -> Classification {
    let mut classification = Classification::default();

    for (key, config) in schema {
        if IGNORED_FIELDS.contains(&key.as_str()) || !config.required {
            continue;
        }

        let allowed_values = config.options().to_vec();
        let kind = FieldKind::detect(!allowed_values.is_empty(), config.schema.as_ref());
        let field = ClassifiedField {
            key: key.clone(),
            name: config.name.clone(),
            required: config.required,
            allowed_values,
            schema: config.schema.clone(),
            kind,
        };

        if let Some(value) = field.seed() {
            classification.seed.insert(key.clone(), value);
        }
        classification.fields.push(field);
    }

    classification
}
