//! Session lifecycle: reuse, refresh or interactive authorization

use chrono::{DateTime, Utc};

use super::endpoint::TokenEndpoint;
use super::prompt::CodePrompt;
use super::session::{Session, SessionStore};
use super::SessionSource;
use crate::error::DrivebackResult;

/// What the stored session allows us to do
#[derive(Debug)]
pub enum SessionState {
    /// Nothing usable on disk
    NoStoredSession,
    /// Stored and usable as-is
    Valid(Session),
    /// Expired, but the refresh token can mint a new access token
    Refreshable(Session),
    /// Expired without a refresh token, or granted the wrong scopes
    NeedsAuthorization,
}

impl SessionState {
    pub fn classify(
        stored: Option<Session>,
        required_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let Some(session) = stored else {
            return Self::NoStoredSession;
        };

        if !session.covers_scopes(required_scopes) {
            Self::NeedsAuthorization
        } else if session.is_valid_at(now) {
            Self::Valid(session)
        } else if session.can_refresh() {
            Self::Refreshable(session)
        } else {
            Self::NeedsAuthorization
        }
    }
}

/// Authorization that is waiting on an externally obtained code
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    url: String,
}

impl PendingAuthorization {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Owns the one session a run uses
pub struct SessionManager<E, P> {
    store: SessionStore,
    endpoint: E,
    prompt: P,
    scopes: Vec<String>,
}

impl<E: TokenEndpoint, P: CodePrompt> SessionManager<E, P> {
    pub fn new(store: SessionStore, endpoint: E, prompt: P, scopes: Vec<String>) -> Self {
        Self {
            store,
            endpoint,
            prompt,
            scopes,
        }
    }

    /// Start an authorization whose code will be supplied later
    pub fn begin_authorization(&self) -> DrivebackResult<PendingAuthorization> {
        let url = self.endpoint.authorization_url(&self.scopes)?;
        Ok(PendingAuthorization { url })
    }

    /// Finish a pending authorization with the operator's code and persist the result
    pub fn complete_authorization(
        &self,
        _pending: PendingAuthorization,
        code: &str,
    ) -> DrivebackResult<Session> {
        let session = self.endpoint.exchange_code(code, &self.scopes)?;
        self.store.save(&session)?;
        tracing::info!("Authorization complete, session stored");
        Ok(session)
    }

    fn authorize_interactively(&mut self) -> DrivebackResult<Session> {
        let pending = self.begin_authorization()?;
        let code = self.prompt.request_code(pending.url())?;
        self.complete_authorization(pending, &code)
    }

    fn refresh(&self, stale: &Session) -> DrivebackResult<Session> {
        let session = self.endpoint.refresh(stale)?;
        self.store.save(&session)?;
        tracing::info!(expiry = ?session.expiry, "Access token refreshed");
        Ok(session)
    }
}

impl<E: TokenEndpoint, P: CodePrompt> SessionSource for SessionManager<E, P> {
    fn obtain_session(&mut self) -> DrivebackResult<Session> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Stored session is unreadable, authorizing again");
                None
            }
        };

        match SessionState::classify(stored, &self.scopes, Utc::now()) {
            SessionState::Valid(session) => {
                tracing::debug!("Reusing stored session");
                Ok(session)
            }
            SessionState::Refreshable(session) => self.refresh(&session),
            SessionState::NoStoredSession => {
                tracing::info!("No stored session, starting authorization");
                self.authorize_interactively()
            }
            SessionState::NeedsAuthorization => {
                tracing::info!("Stored session cannot be refreshed, starting authorization");
                self.authorize_interactively()
            }
        }
    }
}
