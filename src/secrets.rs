//! Keyring-backed storage for the signed-in session.

use identityhub_api::User;
use keyring::{Entry, Error as KeyringError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const KEYRING_ACCOUNT: &str = "session";
pub const KEYRING_SERVICE: &str = "io.identityhub.cli";

/// Session cookie value plus the profile it belongs to, stored as one JSON secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct SecretsManager {
    inner: Arc<SecretsInner>,
}

struct SecretsInner {
    keyring_service: String,
    session_cache: Mutex<Option<StoredSession>>,
}

impl SecretsManager {
    pub fn new(service: &str) -> Self {
        let service = if service.trim().is_empty() {
            KEYRING_SERVICE.to_string()
        } else {
            service.trim().to_string()
        };
        SecretsManager {
            inner: Arc::new(SecretsInner {
                keyring_service: service,
                session_cache: Mutex::new(None),
            }),
        }
    }

    pub fn save_session(&self, token: &str, user: User) -> Result<(), String> {
        let token = token.trim();
        if token.is_empty() {
            return Err("Session token must not be empty".into());
        }

        let session = StoredSession {
            token: token.to_string(),
            user,
        };
        self.persist_session(Some(&session))?;
        *self.cache()? = Some(session);
        Ok(())
    }

    pub fn get_session(&self) -> Result<Option<StoredSession>, String> {
        {
            let cache = self.cache()?;
            if cache.is_some() {
                return Ok(cache.clone());
            }
        }

        let session = self.load_session_from_store()?;
        *self.cache()? = session.clone();
        Ok(session)
    }

    pub fn clear_session(&self) -> Result<(), String> {
        self.persist_session(None)?;
        *self.cache()? = None;
        Ok(())
    }

    fn cache(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredSession>>, String> {
        self.inner
            .session_cache
            .lock()
            .map_err(|_| "Session cache is poisoned".to_string())
    }

    fn load_session_from_store(&self) -> Result<Option<StoredSession>, String> {
        let entry = self.session_entry()?;
        match entry.get_password() {
            Ok(secret) => decode_session(&secret).map(Some),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(err) => Err(format!("Failed to read session from keyring: {err}")),
        }
    }

    fn persist_session(&self, session: Option<&StoredSession>) -> Result<(), String> {
        let entry = self.session_entry()?;
        match session {
            Some(data) => {
                let payload = serde_json::to_string(data)
                    .map_err(|err| format!("Failed to serialize session: {err}"))?;
                entry
                    .set_password(&payload)
                    .map_err(|err| format!("Failed to store session in keyring: {err}"))
            }
            None => match entry.delete_credential() {
                Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
                Err(err) => Err(format!("Failed to delete session from keyring: {err}")),
            },
        }
    }

    fn session_entry(&self) -> Result<Entry, String> {
        Entry::new(&self.inner.keyring_service, KEYRING_ACCOUNT)
            .map_err(|err| format!("Failed to open keyring entry: {err}"))
    }
}

fn decode_session(secret: &str) -> Result<StoredSession, String> {
    serde_json::from_str(secret).map_err(|err| format!("Failed to decode stored session: {err}"))
}
