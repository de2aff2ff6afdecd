//! Display DTOs and conversion helpers between API models and terminal output.

use chrono::{DateTime, Local, Utc};
use identityhub_api::{ApiKey, ClassifiedField, ConnectionStatus, FieldKind, Issue};
use serde::Serialize;

const DATE_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Represents one ticket in the recent-tickets list: key, summary, status, project, creation time and a browse link when the Jira site is known.
#[derive(Serialize, Debug, Clone)]
pub struct TicketRow {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub project: String,
    pub created: String,
    pub url: Option<String>,
}

impl TicketRow {
    pub fn from_issue(issue: &Issue, connection: &ConnectionStatus) -> Self {
        let status = issue.status_name().unwrap_or("Unknown").to_string();
        let project = issue
            .fields
            .project
            .as_ref()
            .map(|project| match &project.name {
                Some(name) => format!("{} ({})", name, project.key),
                None => project.key.clone(),
            })
            .unwrap_or_default();
        let created = issue
            .fields
            .created
            .as_deref()
            .and_then(parse_jira_datetime)
            .map(|created| created.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        Self {
            key: issue.key.clone(),
            summary: collapse_whitespace(issue.summary()),
            status,
            project,
            created,
            url: connection.browse_url(&issue.key),
        }
    }
}

/// Represents an API key in the management list; the secret itself is never part of it.
#[derive(Serialize, Debug, Clone)]
pub struct ApiKeyRow {
    pub id: String,
    pub name: String,
    pub created: String,
    pub last_used: String,
    pub active: bool,
}

impl From<&ApiKey> for ApiKeyRow {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id.clone(),
            name: key.name.clone(),
            created: format_optional_date(key.created_at),
            last_used: format_optional_date(key.last_used_at),
            active: key.is_active,
        }
    }
}

impl ApiKeyRow {
    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

/// Represents one dynamic form field as shown by `jira fields`.
#[derive(Serialize, Debug, Clone)]
pub struct FieldRow {
    pub key: String,
    pub name: String,
    pub kind: &'static str,
    pub required: bool,
    pub supported: bool,
    pub options: Vec<String>,
}

impl From<&ClassifiedField> for FieldRow {
    fn from(field: &ClassifiedField) -> Self {
        Self {
            key: field.key.clone(),
            name: field.name.clone(),
            kind: kind_label(field.kind),
            required: field.required,
            supported: field.is_supported(),
            options: field
                .allowed_values
                .iter()
                .map(|option| format!("{} ({})", option.label(), option.id))
                .collect(),
        }
    }
}

pub fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Select => "select",
        FieldKind::ArrayOfString => "list (comma separated)",
        FieldKind::Date => "date (YYYY-MM-DD)",
        FieldKind::Number => "number",
        FieldKind::Text => "text",
        FieldKind::PlainString => "string",
        FieldKind::Unsupported => "unsupported",
    }
}

/// Jira writes offsets without a colon (`+0000`), which plain RFC 3339 parsing rejects.
pub fn parse_jira_datetime(value: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z").ok())
        .map(|dt| dt.with_timezone(&Local))
}

pub fn format_optional_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.with_timezone(&Local).format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "Never".to_string())
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
