use thiserror::Error;

/// Why a ticket form cannot be submitted. All are fixable by the user (or by opening the ticket in Jira).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(
        "This issue type has required fields IdentityHub cannot fill in. Please open this ticket directly in Jira."
    )]
    UnsupportedRequiredField { field: String },
    #[error("Issue type is required")]
    MissingIssueType,
    #[error("Summary is required")]
    MissingSummary,
    #[error("Description is required")]
    MissingDescription,
    #[error("{0} is required")]
    MissingRequiredField(String),
    #[error("{field} must be a number, got \"{value}\"")]
    InvalidNumberField { field: String, value: String },
}
