//! Validation of ticket-form input and serialization into Jira's create-issue shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

use super::classifier::ClassifiedField;
use super::error::FormError;
use super::kind::FieldKind;
use super::{FieldValue, FormValues};

/// Label attached to every ticket this client creates, so they can be listed later.
pub const IDENTITYHUB_LABEL: &str = "created-from-identityhub";

/// Project and issue type the ticket is created in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTarget {
    pub project_key: String,
    pub issue_type_id: String,
}

impl TicketTarget {
    pub fn new(project_key: impl Into<String>, issue_type_id: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            issue_type_id: issue_type_id.into(),
        }
    }
}

/// The base inputs every ticket form carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub summary: String,
    pub description: String,
    /// Priority option id; `None` or blank leaves Jira's default.
    pub priority: Option<String>,
    pub labels: Vec<String>,
}

/// Optional checks on top of the default validation rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Reject required array fields that have no items. Off by default: an empty list is submitted as `[]`.
    pub require_non_empty_arrays: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self {
            require_non_empty_arrays: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// Atlassian Document Format wrapper Jira requires for rich-text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdfDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub version: u8,
    pub content: Vec<AdfNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdfNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AdfNode>>,
}

impl AdfDocument {
    /// One paragraph holding `text` verbatim.
    pub fn paragraph(text: impl Into<String>) -> Self {
        let text_node = AdfNode {
            node_type: "text".to_string(),
            text: Some(text.into()),
            content: None,
        };
        let paragraph = AdfNode {
            node_type: "paragraph".to_string(),
            text: None,
            content: Some(vec![text_node]),
        };
        Self {
            doc_type: "doc".to_string(),
            version: 1,
            content: vec![paragraph],
        }
    }
}

/// Body of `POST jira/issues`. Additional fields are flattened next to the base ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuePayload {
    pub project: KeyRef,
    pub summary: String,
    pub description: AdfDocument,
    pub issuetype: IdRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<IdRef>,
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

/// Checks the form in a fixed order and reports the first problem found.
pub fn validate(
    draft: &TicketDraft,
    fields: &[ClassifiedField],
    values: &FormValues,
    policy: ValidationPolicy,
) -> Result<(), FormError> {
    if let Some(blocking) = fields
        .iter()
        .find(|field| field.required && !field.is_supported())
    {
        return Err(FormError::UnsupportedRequiredField {
            field: blocking.name.clone(),
        });
    }
    if draft.summary.trim().is_empty() {
        return Err(FormError::MissingSummary);
    }
    if draft.description.trim().is_empty() {
        return Err(FormError::MissingDescription);
    }

    for field in fields.iter().filter(|field| field.required) {
        // Free-text lists may stay empty; multi-selects still need a choice.
        if field.kind == FieldKind::ArrayOfString && !policy.require_non_empty_arrays {
            continue;
        }
        let missing = values.get(&field.key).map_or(true, FieldValue::is_blank);
        if missing {
            return Err(FormError::MissingRequiredField(field.name.clone()));
        }
    }

    Ok(())
}

/// Validates with the default policy and builds the create-issue payload.
pub fn build_payload(
    target: &TicketTarget,
    draft: &TicketDraft,
    fields: &[ClassifiedField],
    values: &FormValues,
) -> Result<IssuePayload, FormError> {
    build_payload_with_policy(target, draft, fields, values, ValidationPolicy::default())
}

pub fn build_payload_with_policy(
    target: &TicketTarget,
    draft: &TicketDraft,
    fields: &[ClassifiedField],
    values: &FormValues,
    policy: ValidationPolicy,
) -> Result<IssuePayload, FormError> {
    validate(draft, fields, values, policy)?;

    let mut extra = IndexMap::new();
    for field in fields.iter().filter(|field| field.is_supported()) {
        if let Some(value) = serialize_field(field, values.get(&field.key))? {
            extra.insert(field.key.clone(), value);
        }
    }

    let priority = draft
        .priority
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| IdRef { id: id.to_string() });

    let mut labels = draft.labels.clone();
    if !labels.iter().any(|label| label == IDENTITYHUB_LABEL) {
        labels.push(IDENTITYHUB_LABEL.to_string());
    }

    Ok(IssuePayload {
        project: KeyRef {
            key: target.project_key.clone(),
        },
        summary: draft.summary.clone(),
        description: AdfDocument::paragraph(draft.description.clone()),
        issuetype: IdRef {
            id: target.issue_type_id.clone(),
        },
        priority,
        labels,
        fields: extra,
    })
}

fn serialize_field(
    field: &ClassifiedField,
    value: Option<&FieldValue>,
) -> Result<Option<Value>, FormError> {
    if field.kind == FieldKind::Select {
        return Ok(match value {
            Some(FieldValue::Text(id)) if !id.trim().is_empty() && field.is_array() => {
                Some(json!([{ "id": id }]))
            }
            Some(FieldValue::Text(id)) if !id.trim().is_empty() => Some(json!({ "id": id })),
            Some(FieldValue::List(ids)) if !ids.is_empty() => Some(Value::Array(
                ids.iter().map(|id| json!({ "id": id })).collect(),
            )),
            _ => None,
        });
    }

    if field.is_array() {
        let items = match value {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(text)) if !text.trim().is_empty() => vec![text.clone()],
            _ => Vec::new(),
        };
        return Ok(Some(Value::from(items)));
    }

    let Some(value) = value.filter(|value| !value.is_blank()) else {
        return Ok(None);
    };

    match (field.kind, value) {
        (FieldKind::Number, FieldValue::Text(text)) => coerce_number(field, text).map(Some),
        (FieldKind::Number, FieldValue::List(items)) => Err(FormError::InvalidNumberField {
            field: field.name.clone(),
            value: items.join(","),
        }),
        (_, FieldValue::Text(text)) => Ok(Some(Value::String(text.clone()))),
        (_, FieldValue::List(items)) => Ok(Some(Value::from(items.clone()))),
    }
}

/// Integers stay integers; anything that is not a finite number is rejected.
fn coerce_number(field: &ClassifiedField, raw: &str) -> Result<Value, FormError> {
    let trimmed = raw.trim();
    let invalid = || FormError::InvalidNumberField {
        field: field.name.clone(),
        value: raw.to_string(),
    };

    if let Ok(integer) = trimmed.parse::<i64>() {
        return Ok(Value::Number(integer.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::classify;
    use crate::models::IssueTypeSchema;
    use serde_json::json;

    fn classified(value: serde_json::Value) -> (Vec<ClassifiedField>, FormValues) {
        let schema: IssueTypeSchema = serde_json::from_value(value).expect("valid schema fixture");
        let classification = classify(&schema);
        (classification.fields, classification.seed)
    }

    fn draft(summary: &str, description: &str) -> TicketDraft {
        TicketDraft {
            summary: summary.to_string(),
            description: description.to_string(),
            ..TicketDraft::default()
        }
    }

    fn target() -> TicketTarget {
        TicketTarget::new("PROJ", "10001")
    }

    #[test]
    fn base_ticket_matches_jira_contract() {
        let mut draft = draft("Stale key", "rotate it");
        draft.priority = Some("3".into());

        let payload = build_payload(&target(), &draft, &[], &FormValues::new()).unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "project": { "key": "PROJ" },
                "summary": "Stale key",
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "rotate it" }] }]
                },
                "issuetype": { "id": "10001" },
                "priority": { "id": "3" },
                "labels": ["created-from-identityhub"]
            })
        );
    }

    #[test]
    fn unsupported_required_field_is_reported_before_base_fields() {
        let (fields, values) = classified(json!({
            "reporter": { "name": "Reporter", "required": true, "schema": { "type": "user" } }
        }));

        let err = build_payload(&target(), &draft("", ""), &fields, &values).unwrap_err();
        assert_eq!(
            err,
            FormError::UnsupportedRequiredField {
                field: "Reporter".into()
            }
        );

        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert!(matches!(err, FormError::UnsupportedRequiredField { .. }));
        assert!(err.to_string().contains("directly in Jira"));
    }

    #[test]
    fn summary_then_description_must_be_present() {
        assert_eq!(
            build_payload(&target(), &draft("   ", ""), &[], &FormValues::new()).unwrap_err(),
            FormError::MissingSummary
        );
        assert_eq!(
            build_payload(&target(), &draft("S", " \n\t"), &[], &FormValues::new()).unwrap_err(),
            FormError::MissingDescription
        );
    }

    #[test]
    fn seeded_select_passes_and_cleared_select_fails() {
        let (fields, mut values) = classified(json!({
            "severity": {
                "name": "severity",
                "required": true,
                "allowedValues": [{ "id": "1", "name": "Low" }, { "id": "2", "name": "High" }]
            }
        }));

        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["severity"], json!({ "id": "1" }));

        values.insert("severity".into(), FieldValue::Text(String::new()));
        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("severity".into()));

        values.shift_remove("severity");
        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("severity".into()));
    }

    #[test]
    fn cleared_multi_select_fails_even_with_tolerant_arrays() {
        let (fields, mut values) = classified(json!({
            "regions": {
                "name": "Regions",
                "required": true,
                "allowedValues": [{ "id": "5", "value": "EU" }],
                "schema": { "type": "array", "items": "option" }
            }
        }));

        values.insert("regions".into(), FieldValue::Text(String::new()));
        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("Regions".into()));

        values.insert("regions".into(), FieldValue::List(Vec::new()));
        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("Regions".into()));

        values.insert("regions".into(), "5".into());
        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["regions"], json!([{ "id": "5" }]));
    }

    #[test]
    fn select_values_serialize_as_ids_never_labels() {
        let (fields, mut values) = classified(json!({
            "environment": {
                "name": "Environment",
                "required": true,
                "allowedValues": [{ "id": "10020", "value": "Production" }, { "id": "10021", "value": "Staging" }],
                "schema": { "type": "option" }
            },
            "regions": {
                "name": "Regions",
                "required": true,
                "allowedValues": [{ "id": "5", "value": "EU" }, { "id": "6", "value": "US" }],
                "schema": { "type": "array", "items": "option" }
            }
        }));
        values.insert("environment".into(), "10021".into());
        values.insert("regions".into(), vec!["5".to_string(), "6".to_string()].into());

        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["environment"], json!({ "id": "10021" }));
        assert_eq!(payload.fields["regions"], json!([{ "id": "5" }, { "id": "6" }]));
    }

    #[test]
    fn array_fields_pass_through_and_tolerate_empty() {
        let (fields, mut values) = classified(json!({
            "labels_custom": { "name": "Tags", "required": true, "schema": { "type": "array", "items": "string" } }
        }));

        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["labels_custom"], json!([]));

        values.shift_remove("labels_custom");
        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["labels_custom"], json!([]));

        values.insert("labels_custom".into(), vec!["a".to_string(), "b".to_string()].into());
        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["labels_custom"], json!(["a", "b"]));
    }

    #[test]
    fn strict_policy_rejects_empty_required_arrays() {
        let (fields, values) = classified(json!({
            "labels_custom": { "name": "Tags", "required": true, "schema": { "type": "array", "items": "string" } }
        }));

        let err = build_payload_with_policy(
            &target(),
            &draft("S", "D"),
            &fields,
            &values,
            ValidationPolicy::strict(),
        )
        .unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("Tags".into()));
    }

    #[test]
    fn numbers_are_coerced_and_garbage_is_rejected() {
        let (fields, mut values) = classified(json!({
            "points": { "name": "Points", "required": true, "schema": { "type": "number" } },
            "risk": { "name": "Risk score", "required": true, "schema": { "type": "number" } }
        }));
        values.insert("points".into(), " 5 ".into());
        values.insert("risk".into(), "7.5".into());

        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["points"], json!(5));
        assert_eq!(payload.fields["risk"], json!(7.5));

        values.insert("risk".into(), "high".into());
        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(
            err,
            FormError::InvalidNumberField {
                field: "Risk score".into(),
                value: "high".into()
            }
        );
    }

    #[test]
    fn text_and_date_values_are_sent_raw() {
        let (fields, mut values) = classified(json!({
            "due": { "name": "Due", "required": true, "schema": { "type": "date" } },
            "owner": { "name": "Owner", "required": true, "schema": { "type": "string" } }
        }));
        values.insert("due".into(), "2024-06-30".into());
        values.insert("owner".into(), " svc-deploy ".into());

        let payload = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap();
        assert_eq!(payload.fields["due"], json!("2024-06-30"));
        assert_eq!(payload.fields["owner"], json!(" svc-deploy "));

        let keys: Vec<&str> = payload.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["due", "owner"]);
    }

    #[test]
    fn required_string_needs_non_blank_value() {
        let (fields, values) = classified(json!({
            "owner": { "name": "Owner", "required": true, "schema": { "type": "string" } }
        }));

        let err = build_payload(&target(), &draft("S", "D"), &fields, &values).unwrap_err();
        assert_eq!(err, FormError::MissingRequiredField("Owner".into()));
    }

    #[test]
    fn existing_labels_keep_order_and_gain_the_tag_once() {
        let mut draft = draft("S", "D");
        draft.labels = vec!["nhi".into(), IDENTITYHUB_LABEL.into()];
        let payload = build_payload(&target(), &draft, &[], &FormValues::new()).unwrap();
        assert_eq!(payload.labels, vec!["nhi".to_string(), IDENTITYHUB_LABEL.to_string()]);

        draft.labels = vec!["nhi".into()];
        draft.priority = Some("  ".into());
        let payload = build_payload(&target(), &draft, &[], &FormValues::new()).unwrap();
        assert_eq!(payload.labels, vec!["nhi".to_string(), IDENTITYHUB_LABEL.to_string()]);
        assert!(payload.priority.is_none());
        assert!(serde_json::to_value(&payload).unwrap().get("priority").is_none());
    }
}
