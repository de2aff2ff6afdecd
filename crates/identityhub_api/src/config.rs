use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:3030";
pub const DEFAULT_API_PREFIX: &str = "api";
pub const DEFAULT_USER_AGENT: &str = "identityhub-cli";
pub const DEFAULT_SESSION_COOKIE: &str = "loginToken";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_COOLDOWN_MS: u64 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How requests prove who the caller is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    Anonymous,
    /// Session cookie value issued by `auth/login`.
    Session(String),
    /// Long-lived key for programmatic ticket creation.
    ApiKey(String),
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Anonymous => "anonymous",
            AuthMethod::Session(_) => "session",
            AuthMethod::ApiKey(_) => "api-key",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HubConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub auth: AuthMethod,
    pub session_cookie: String,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl HubConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            auth: AuthMethod::Anonymous,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Session(token.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey(key.into());
        self
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Base URL plus API prefix, always ending in `/`.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{prefix}/")
        }
    }
}
