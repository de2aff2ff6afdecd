//! Typed IdentityHub backend client and the ticket-form resolver used to create Jira tickets.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod poll;
pub mod rate_limiter;

pub use auth::Session;
pub use client::HubClient;
pub use config::{AuthMethod, HubConfig};
pub use error::{HubError, Result};
pub use form::{
    build_payload, classify, Classification, ClassifiedField, FieldKind, FieldValue, FormError,
    FormValues, IssuePayload, TicketDraft, TicketTarget,
};
pub use models::{
    AllowedValue, ApiKey, ConnectionStatus, CreatedIssue, FieldConfig, FieldSchema,
    GeneratedApiKey, Issue, IssueType, IssueTypeSchema, OAuthStart, Project, ProjectMetadata,
    User,
};
pub use poll::{IndexState, PollPolicy};
