//! Account sign-in against the IdentityHub backend.
//!
//! The backend answers `auth/login` and `auth/signup` with the user profile
//! and sets a session cookie; the cookie value is what later clients send via
//! [`HubConfig::with_session`](crate::config::HubConfig::with_session).

use reqwest::header::SET_COOKIE;
use reqwest::{Method, Response};
use serde_json::Value;

use crate::client::HubClient;
use crate::error::{HubError, Result};
use crate::models::{LoginCredentials, SignupCredentials, User};

/// A signed-in user and the session cookie value that authenticates them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub async fn login(client: &HubClient, credentials: &LoginCredentials) -> Result<Session> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(HubError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }
    let response = client
        .send_raw(Method::POST, "auth/login", Some(credentials))
        .await?;
    read_session(client, response).await
}

pub async fn signup(client: &HubClient, credentials: &SignupCredentials) -> Result<Session> {
    if credentials.name.trim().is_empty()
        || credentials.email.trim().is_empty()
        || credentials.password.is_empty()
    {
        return Err(HubError::InvalidInput(
            "Name, email and password are required".to_string(),
        ));
    }
    let response = client
        .send_raw(Method::POST, "auth/signup", Some(credentials))
        .await?;
    read_session(client, response).await
}

pub async fn logout(client: &HubClient) -> Result<()> {
    client
        .send_expect_empty(Method::POST, "auth/logout", None::<&Value>)
        .await
}

async fn read_session(client: &HubClient, response: Response) -> Result<Session> {
    let cookie_name = &client.config().session_cookie;
    let token = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name));

    let user: User = HubClient::parse_json(response).await?;
    let token = token.ok_or_else(|| {
        HubError::Authentication(format!(
            "backend did not issue a {} session cookie",
            cookie_name
        ))
    })?;
    Ok(Session { user, token })
}

/// Value of `name` in a `Set-Cookie` header, ignoring attributes such as `Path` or `HttpOnly`.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (key, value) = pair.split_once('=')?;
    (key.trim() == name && !value.trim().is_empty()).then(|| value.trim().to_string())
}
