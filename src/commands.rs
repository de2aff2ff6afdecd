//! Operations the command line invokes, each returning a user-facing message on failure.

use identityhub_api::auth::{self, Session};
use identityhub_api::models::{LoginCredentials, SignupCredentials};
use identityhub_api::poll::{wait_until_indexed, IndexState};
use identityhub_api::{
    ConnectionStatus, GeneratedApiKey, HubClient, HubConfig, HubError, OAuthStart, Project, User,
};
use log::{info, warn};
use std::time::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::bridge::{collapse_whitespace, ApiKeyRow, TicketRow};
use crate::config::Config;
use crate::secrets::SecretsManager;
use crate::ticket_form::TicketFormSession;

/// Result of a successful ticket submission.
#[derive(Debug, Clone)]
pub struct CreatedTicket {
    pub key: String,
    pub url: Option<String>,
    /// `None` when indexing was not awaited.
    pub indexed: Option<bool>,
}

pub struct App {
    config: Config,
    client: HubClient,
    secrets: SecretsManager,
}

impl App {
    /// Builds a client authenticated with the explicit API key, else the stored session, else anonymously.
    pub fn new(
        config: Config,
        secrets: SecretsManager,
        api_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, String> {
        let base_url = api_url.unwrap_or_else(|| config.api_base_url.clone());
        let mut hub_config = HubConfig::new(base_url)
            .with_session_cookie(config.session_cookie.clone())
            .with_timeout(Duration::from_secs(config.request_timeout_secs.max(1)));

        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => hub_config = hub_config.with_api_key(key.trim()),
            None => match secrets.get_session() {
                Ok(Some(session)) => hub_config = hub_config.with_session(session.token),
                Ok(None) => {}
                Err(err) => warn!("Ignoring stored session: {}", redact_log_details(&err)),
            },
        }

        let client = HubClient::new(hub_config).map_err(describe)?;
        Ok(Self {
            config,
            client,
            secrets,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_user(&self) -> Option<User> {
        self.secrets
            .get_session()
            .ok()
            .flatten()
            .map(|session| session.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, String> {
        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let session = auth::login(&self.client, &credentials)
            .await
            .map_err(describe)?;
        self.remember(session)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, String> {
        let credentials = SignupCredentials {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let session = auth::signup(&self.client, &credentials)
            .await
            .map_err(describe)?;
        self.remember(session)
    }

    /// Clears the local session even when the backend call fails.
    pub async fn logout(&self) -> Result<(), String> {
        if let Err(err) = auth::logout(&self.client).await {
            warn!("Backend logout failed: {}", redact_log_details(&err.to_string()));
        }
        self.secrets.clear_session()
    }

    fn remember(&self, session: Session) -> Result<User, String> {
        let user = session.user.clone();
        self.secrets.save_session(&session.token, session.user)?;
        info!("Signed in as {}", user.display());
        Ok(user)
    }

    pub async fn connection_status(&self) -> Result<ConnectionStatus, String> {
        self.client.connection_status().await.map_err(describe)
    }

    pub async fn connect(&self) -> Result<OAuthStart, String> {
        self.client.initiate_oauth().await.map_err(describe)
    }

    pub async fn disconnect(&self) -> Result<String, String> {
        let response = self.client.disconnect().await.map_err(describe)?;
        Ok(response
            .message
            .unwrap_or_else(|| "Jira disconnected successfully".to_string()))
    }

    async fn require_connection(&self) -> Result<ConnectionStatus, String> {
        let status = self.connection_status().await?;
        if status.is_connected {
            Ok(status)
        } else {
            Err("Please connect to Jira first (identityhub jira connect)".to_string())
        }
    }

    pub async fn projects(&self) -> Result<Vec<Project>, String> {
        self.require_connection().await?;
        let projects = self.client.projects().await.map_err(describe)?;
        if projects.is_empty() {
            warn!("No projects found in the connected Jira workspace");
        }
        Ok(projects)
    }

    /// Loads a project and its create-meta into a fresh form.
    pub async fn open_form(&self, project_key: Option<&str>) -> Result<TicketFormSession, String> {
        let key = project_key
            .map(str::to_string)
            .or_else(|| self.config.default_project.clone())
            .ok_or_else(|| "Select a project with --project".to_string())?;

        let projects = self.projects().await?;
        let project = projects
            .into_iter()
            .find(|project| project.key.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| format!("Project {} was not found in your Jira workspace", key))?;
        let metadata = self
            .client
            .project_metadata(&project.key)
            .await
            .map_err(|err| format!("Failed to load project configuration: {}", describe(err)))?;

        Ok(TicketFormSession::new(project, metadata))
    }

    /// Submits the form, clearing it only once the ticket exists, and when asked waits for the ticket to be searchable.
    pub async fn create_ticket(
        &self,
        form: &mut TicketFormSession,
        wait_for_index: bool,
    ) -> Result<CreatedTicket, String> {
        let payload = form.build_payload().map_err(|err| err.to_string())?;
        let created = self
            .client
            .create_issue(&payload)
            .await
            .map_err(|err| format!("Failed to create ticket: {}", describe(err)))?;
        form.reset_after_success();
        info!("Ticket {} created successfully", created.key);

        let status = self.connection_status().await.unwrap_or_default();
        let indexed = if wait_for_index {
            let state = wait_until_indexed(&self.client, &created.key, self.config.poll_policy())
                .await
                .map_err(describe)?;
            if let IndexState::TimedOut { attempts } = state {
                warn!("{} not visible after {} attempts", created.key, attempts);
            }
            Some(state.is_indexed())
        } else {
            None
        };

        Ok(CreatedTicket {
            url: status.browse_url(&created.key),
            key: created.key,
            indexed,
        })
    }

    /// Recent tickets of one project, or every ticket IdentityHub created when no project is given.
    pub async fn recent_tickets(
        &self,
        project_key: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<TicketRow>, String> {
        let status = self.require_connection().await?;
        let limit = limit.or(Some(self.config.recent_tickets_limit));
        let issues = match project_key {
            Some(key) => self.client.recent_issues(key, limit).await,
            None => self.client.identityhub_issues(limit).await,
        }
        .map_err(|err| format!("Failed to load tickets: {}", describe(err)))?;

        Ok(issues
            .iter()
            .map(|issue| TicketRow::from_issue(issue, &status))
            .collect())
    }

    pub async fn api_keys(&self) -> Result<Vec<ApiKeyRow>, String> {
        let keys = self
            .client
            .api_keys()
            .await
            .map_err(|err| format!("Failed to load API keys: {}", describe(err)))?;
        Ok(keys.iter().map(ApiKeyRow::from).collect())
    }

    pub async fn generate_api_key(&self, name: &str) -> Result<GeneratedApiKey, String> {
        self.client.generate_api_key(name).await.map_err(describe)
    }

    pub async fn delete_api_key(&self, key_id: &str) -> Result<(), String> {
        self.client.delete_api_key(key_id).await.map_err(describe)
    }
}

/// Turns a client error into the message shown to the user.
pub fn describe(err: HubError) -> String {
    warn!("Backend call failed: {}", redact_log_details(&err.to_string()));
    if err.is_auth() {
        return "Your session is not valid. Log in again with `identityhub login`.".to_string();
    }
    if matches!(err, HubError::Network(_) | HubError::Timeout(_)) {
        return format!("Could not reach the IdentityHub backend: {}", err);
    }
    match err {
        HubError::Http { message, .. } => message,
        HubError::InvalidInput(message) | HubError::NotFound(message) => message,
        other => other.to_string(),
    }
}

static CREDENTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bihk_[\w-]+|\b(?:logintoken|x-api-key|api_?key|password|authorization|token)\s*[=:]\s*\S+")
        .expect("invalid credential regex")
});

const LOG_DETAIL_LIMIT: usize = 180;

/// One line, at most `LOG_DETAIL_LIMIT` chars, with cookies, API keys and passwords masked.
pub fn redact_log_details(value: &str) -> String {
    let line = collapse_whitespace(value);
    clip(&CREDENTIAL.replace_all(&line, "<redacted>"), LOG_DETAIL_LIMIT)
}

fn clip(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit.saturating_sub(1)) {
        Some((cut, _)) if value.chars().count() > limit => format!("{}…", &value[..cut]),
        _ => value.to_string(),
    }
}
