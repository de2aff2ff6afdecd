//! Dynamic ticket-form resolution.
//!
//! Jira issue types carry their own required fields. [`classify`] works out
//! which of them a form has to render beyond the base inputs (summary,
//! description, priority) and seeds their values; [`build_payload`] checks
//! the entered values and produces the body `POST jira/issues` expects.
//! Both are pure: callers re-run [`classify`] whenever the selected issue
//! type changes and drop the previous result.

mod classifier;
mod error;
mod kind;
mod payload;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use classifier::{classify, ClassifiedField, Classification};
pub use error::FormError;
pub use kind::FieldKind;
pub use payload::{
    build_payload, build_payload_with_policy, validate, AdfDocument, AdfNode, IdRef, IssuePayload,
    KeyRef, TicketDraft, TicketTarget, ValidationPolicy, IDENTITYHUB_LABEL,
};

/// Fields the form always renders itself (or that are set from context), never classified.
pub const IGNORED_FIELDS: [&str; 6] = [
    "summary",
    "description",
    "priority",
    "project",
    "issuetype",
    "labels",
];

/// A value entered for one classified field. Select fields hold the chosen option id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Empty list, or a string that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// Current form input keyed by field key.
pub type FormValues = IndexMap<String, FieldValue>;
