use std::{fmt, str::FromStr, time::Duration};

use moka::sync::Cache;
use uuid::Uuid;

use crate::{configuration::SessionSettings, domain::search::SearchParams};

use super::search_service::SearchResults;

pub const SESSION_COOKIE: &str = "jobs_dash_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionId)
    }
}

/// What one browser has searched for and got back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub last_params: Option<SearchParams>,
    pub results: Option<SearchResults>,
}

/// Per-session state. Entries idle past the configured TTL are evicted.
pub struct SessionStore {
    sessions: Cache<SessionId, SessionState>,
}

impl SessionStore {
    pub fn new(settings: &SessionSettings) -> Self {
        let sessions = Cache::builder()
            .max_capacity(settings.capacity as u64)
            .time_to_idle(Duration::from_secs(settings.idle_ttl_secs))
            .build();
        SessionStore { sessions }
    }

    /// State for `id`, empty when the session is new or expired.
    pub fn get(&self, id: &SessionId) -> SessionState {
        self.sessions.get(id).unwrap_or_default()
    }

    pub fn put(&self, id: SessionId, state: SessionState) {
        self.sessions.insert(id, state);
    }
}
