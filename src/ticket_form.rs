//! Form state for creating one ticket: project, issue type, base inputs and the dynamic fields.
//!
//! The session owns the classification. Every issue-type change replaces it
//! and re-seeds the values; nothing from the previous issue type survives.

use identityhub_api::form::{
    build_payload_with_policy, classify, Classification, ClassifiedField, FieldKind, FieldValue,
    FormError, FormValues, IssuePayload, TicketDraft, TicketTarget, ValidationPolicy,
};
use identityhub_api::{IssueType, Project, ProjectMetadata};

pub struct TicketFormSession {
    project: Project,
    metadata: ProjectMetadata,
    issue_type: Option<IssueType>,
    classification: Classification,
    values: FormValues,
    draft: TicketDraft,
    policy: ValidationPolicy,
}

impl TicketFormSession {
    pub fn new(project: Project, metadata: ProjectMetadata) -> Self {
        Self {
            project,
            metadata,
            issue_type: None,
            classification: Classification::default(),
            values: FormValues::new(),
            draft: TicketDraft::default(),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn issue_types(&self) -> &[IssueType] {
        &self.metadata.issuetypes
    }

    pub fn issue_type(&self) -> Option<&IssueType> {
        self.issue_type.as_ref()
    }

    pub fn fields(&self) -> &[ClassifiedField] {
        &self.classification.fields
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    /// Switches issue type, discarding the previous classification and every entered value.
    pub fn select_issue_type(&mut self, issue_type_id: &str) -> Result<&[ClassifiedField], String> {
        let issue_type = self
            .metadata
            .issue_type(issue_type_id)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "Issue type {} is not available in project {}",
                    issue_type_id, self.project.key
                )
            })?;

        log::debug!(
            "Classifying {} fields for issue type {} ({})",
            issue_type.fields.len(),
            issue_type.name,
            issue_type.id
        );
        self.classification = classify(&issue_type.fields);
        self.issue_type = Some(issue_type);
        self.reset();
        Ok(&self.classification.fields)
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.draft.summary = summary.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Accepts a priority id or name from the selected issue type's options.
    pub fn set_priority_input(&mut self, raw: &str) -> Result<(), String> {
        let wanted = raw.trim();
        let priorities = self
            .issue_type
            .as_ref()
            .map(IssueType::priorities)
            .unwrap_or_default();
        let priority = priorities
            .iter()
            .find(|priority| priority.id == wanted)
            .or_else(|| {
                priorities
                    .iter()
                    .find(|priority| priority.label().eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| format!("Unknown priority {:?}", raw))?;
        self.draft.priority = Some(priority.id.clone());
        Ok(())
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !label.trim().is_empty() && !self.draft.labels.contains(&label) {
            self.draft.labels.push(label);
        }
    }

    /// Parses raw text for a classified field: lists are comma separated, selects accept an option id or label.
    /// Blank input clears the field, dropping its seeded default.
    pub fn set_field_input(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let field = self
            .classification
            .field(key)
            .ok_or_else(|| format!("{} is not a field of this issue type", key))?;
        if raw.trim().is_empty() && field.is_supported() {
            self.clear_field(key);
            return Ok(());
        }

        let value = match field.kind {
            FieldKind::Unsupported => {
                return Err(format!("{} cannot be filled in from IdentityHub", field.name));
            }
            FieldKind::Select => {
                let option = field.resolve_option(raw).ok_or_else(|| {
                    let choices: Vec<&str> =
                        field.allowed_values.iter().map(|option| option.label()).collect();
                    format!("{} must be one of: {}", field.name, choices.join(", "))
                })?;
                FieldValue::Text(option.id.clone())
            }
            FieldKind::ArrayOfString => FieldValue::List(split_list(raw)),
            _ => FieldValue::Text(raw.to_string()),
        };

        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn clear_field(&mut self, key: &str) {
        self.values.shift_remove(key);
    }

    /// Validates and builds the payload without touching the entered values.
    pub fn build_payload(&self) -> Result<IssuePayload, FormError> {
        let issue_type = self.issue_type.as_ref().ok_or(FormError::MissingIssueType)?;
        let target = TicketTarget::new(self.project.key.clone(), issue_type.id.clone());

        build_payload_with_policy(
            &target,
            &self.draft,
            &self.classification.fields,
            &self.values,
            self.policy,
        )
    }

    /// Clears the inputs once the ticket exists remotely; the issue type stays selected.
    pub fn reset_after_success(&mut self) {
        self.reset();
    }

    /// True when a required field can only be filled in Jira itself.
    pub fn needs_jira(&self) -> bool {
        self.classification.blocks_submission()
    }

    fn reset(&mut self) {
        self.values = self.classification.seed.clone();
        self.draft = TicketDraft {
            priority: self.default_priority(),
            ..TicketDraft::default()
        };
    }

    fn default_priority(&self) -> Option<String> {
        self.issue_type
            .as_ref()
            .and_then(|issue_type| issue_type.priorities().first())
            .map(|priority| priority.id.clone())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
