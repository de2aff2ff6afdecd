//! API keys used by external tools to create tickets without a browser session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::deserialize_id;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyList {
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

/// Returned once on creation; the secret is never shown again.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedApiKey {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub api_key: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiKeyCreateRequest<'a> {
    pub name: &'a str,
}
