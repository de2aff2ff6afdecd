mod api_key;
mod connection;
mod field;
mod issue;
mod project;
mod user;

pub use api_key::{ApiKey, ApiKeyList, GeneratedApiKey};
pub(crate) use api_key::ApiKeyCreateRequest;
pub use connection::{ConnectionStatus, MessageResponse, OAuthStart};
pub use field::{AllowedValue, FieldConfig, FieldSchema, IssueTypeSchema};
pub use issue::{CreatedIssue, Issue, IssueFields, NamedRef, ProjectRef};
pub use project::{IssueType, Project, ProjectMetadata, ProjectMetadataResponse};
pub use user::{LoginCredentials, SignupCredentials, User};
