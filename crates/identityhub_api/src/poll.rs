//! Waits for a freshly created ticket to show up in the IdentityHub ticket list.
//!
//! Jira indexes new issues asynchronously, so the label search can lag the
//! create call by a few seconds.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::client::HubClient;
use crate::error::Result;
use crate::models::Issue;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const POLL_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IndexState {
    Indexed(Issue),
    TimedOut { attempts: u32 },
}

impl IndexState {
    pub fn is_indexed(&self) -> bool {
        matches!(self, IndexState::Indexed(_))
    }
}

/// Polls until `issue_key` is listed, sleeping `interval` between attempts. Remote errors end the poll.
pub async fn wait_until_indexed(
    client: &HubClient,
    issue_key: &str,
    policy: PollPolicy,
) -> Result<IndexState> {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        let issues = client.identityhub_issues(Some(POLL_PAGE_SIZE)).await?;
        if let Some(issue) = issues.into_iter().find(|issue| issue.key == issue_key) {
            debug!(key = issue_key, attempt, "issue visible in ticket list");
            return Ok(IndexState::Indexed(issue));
        }
        debug!(key = issue_key, attempt, attempts, "issue not indexed yet");
        if attempt < attempts {
            sleep(policy.interval).await;
        }
    }
    Ok(IndexState::TimedOut { attempts })
}
