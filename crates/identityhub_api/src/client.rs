use crate::config::{AuthMethod, HubConfig, API_KEY_HEADER};
use crate::error::{HubError, Result};
use crate::form::IssuePayload;
use crate::models::{
    ApiKey, ApiKeyCreateRequest, ApiKeyList, ConnectionStatus, CreatedIssue, GeneratedApiKey,
    Issue, MessageResponse, OAuthStart, Project, ProjectMetadata, ProjectMetadataResponse,
};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_RECENT_LIMIT: u32 = 10;
const MAX_RECENT_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct HubClient {
    http: HttpClient,
    config: HubConfig,
    limiter: RateLimiter,
}

impl HubClient {
    pub fn new(config: HubConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_with_body(Method::GET, path, Option::<&Value>::None).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        debug!(method = "GET", path, "backend request");
        let response = self.http.get(self.url_for(path)).query(query).send().await?;
        Self::parse_json(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_expect_empty(Method::DELETE, path, None::<&Value>).await
    }

    pub async fn send_with_body<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_raw(method, path, body).await?;
        Self::parse_json(response).await
    }

    pub async fn send_expect_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send_raw(method, path, body).await?;
        Self::ensure_success(response).await
    }

    /// Sends a paced request and hands back the response without checking its status.
    pub(crate) async fn send_raw<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.limiter.hit().await;
        debug!(method = %method, path, "backend request");
        let mut request = self.http.request(method, self.url_for(path));
        if let Some(payload) = body {
            request = request.json(payload);
        }
        Ok(request.send().await?)
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    pub(crate) async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(HubError::from)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(build_error(status, &body))
        }
    }

    async fn ensure_success(response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(build_error(status, &body))
        }
    }

    /// Starts the Jira OAuth flow; the user must open the returned URL.
    pub async fn initiate_oauth(&self) -> Result<OAuthStart> {
        self.get("jira/auth").await
    }

    pub async fn disconnect(&self) -> Result<MessageResponse> {
        self.send_with_body(Method::DELETE, "jira/disconnect", None::<&Value>)
            .await
    }

    pub async fn connection_status(&self) -> Result<ConnectionStatus> {
        self.get("jira/status").await
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.get("jira/projects").await
    }

    /// Create-meta for one project, unwrapped from Jira's single-element project list.
    pub async fn project_metadata(&self, project_key: &str) -> Result<ProjectMetadata> {
        let key = validate_project_key(project_key)?;
        let path = format!("jira/projects/{}/metadata", key);
        let response: ProjectMetadataResponse = self.get(&path).await?;
        response
            .projects
            .into_iter()
            .next()
            .ok_or_else(|| HubError::NotFound(format!("No project data found for {}", key)))
    }

    pub async fn create_issue(&self, payload: &IssuePayload) -> Result<CreatedIssue> {
        let created: CreatedIssue = self.post("jira/issues", payload).await.inspect_err(|err| {
            warn!(project = %payload.project.key, error = %err, "issue creation failed");
        })?;
        info!(key = %created.key, "created jira issue");
        Ok(created)
    }

    pub async fn recent_issues(&self, project_key: &str, max_results: Option<u32>) -> Result<Vec<Issue>> {
        let key = validate_project_key(project_key)?;
        let path = format!("jira/projects/{}/issues", key);
        self.get_with_query(&path, &[("maxResults", clamp_limit(max_results))])
            .await
    }

    /// Tickets carrying the IdentityHub label, newest first.
    pub async fn identityhub_issues(&self, max_results: Option<u32>) -> Result<Vec<Issue>> {
        self.get_with_query("jira/issues/identityhub", &[("maxResults", clamp_limit(max_results))])
            .await
    }

    pub async fn api_keys(&self) -> Result<Vec<ApiKey>> {
        let list: ApiKeyList = self.get("apikeys").await?;
        Ok(list.api_keys)
    }

    pub async fn generate_api_key(&self, name: &str) -> Result<GeneratedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::InvalidInput(
                "Please enter a name for the API key".to_string(),
            ));
        }
        self.post("apikeys", &ApiKeyCreateRequest { name }).await
    }

    pub async fn delete_api_key(&self, key_id: &str) -> Result<()> {
        let key_id = key_id.trim();
        if key_id.is_empty() || key_id.contains('/') {
            return Err(HubError::InvalidInput(format!("invalid API key id {:?}", key_id)));
        }
        self.delete(&format!("apikeys/{}", key_id)).await
    }
}

fn clamp_limit(max_results: Option<u32>) -> String {
    max_results
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT)
        .to_string()
}

/// Jira project keys are letters, digits and underscores; anything else never reaches a URL path.
pub fn validate_project_key(key: &str) -> Result<&str> {
    let trimmed = key.trim();
    if !trimmed.is_empty() && trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(trimmed)
    } else {
        Err(HubError::InvalidInput(format!("invalid project key {:?}", key)))
    }
}

fn build_http_client(config: &HubConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    match &config.auth {
        AuthMethod::Anonymous => {}
        AuthMethod::Session(token) => {
            let cookie = format!("{}={}", config.session_cookie, token);
            let mut value = header_value(cookie)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }
        AuthMethod::ApiKey(key) => {
            let mut value = header_value(key.clone())?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
    }
    debug!(base = %config.base_url, auth = config.auth.as_str(), "building backend client");

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| HubError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| HubError::InvalidInput(err.to_string()))
}

pub(crate) fn build_error(status: StatusCode, body: &str) -> HubError {
    let message = extract_field(body, &["message", "error", "err"]).unwrap_or_else(|| body.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            HubError::Authentication(format!("Access denied ({}) - {}", status, message))
        }
        StatusCode::NOT_FOUND => HubError::NotFound(message),
        _ => {
            let code = extract_field(body, &["code"]);
            HubError::http(status, code, message)
        }
    }
}

fn extract_field(body: &str, names: &[&str]) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    names
        .iter()
        .find_map(|name| value.get(name).and_then(Value::as_str).map(str::to_string))
}
