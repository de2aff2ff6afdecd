//! Jira connection state as tracked by the backend.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub site_url: Option<String>,
}

impl ConnectionStatus {
    /// Link to an issue on the connected Jira site, if the site is known.
    pub fn browse_url(&self, issue_key: &str) -> Option<String> {
        self.site_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| format!("{}/browse/{}", url.trim_end_matches('/'), issue_key))
    }
}

/// Authorization URL the user must open to grant the backend access to Jira.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStart {
    pub auth_url: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
