//! OAuth session record and its on-disk store

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{DrivebackError, DrivebackResult};
use crate::storage::file_io::{read_json_optional, write_json_atomic};

/// Tokens are treated as expired this long before their real expiry
const EXPIRY_SKEW_SECONDS: i64 = 10;

/// Authenticated credential material for the remote store
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    /// Bearer token sent with every remote call
    pub access_token: String,

    /// Long-lived token used to mint new access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token stops working; `None` means it does not expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub expiry: Option<DateTime<Utc>>,

    /// Scopes granted to the access token
    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expiry: Option<DateTime<Utc>>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expiry,
            scopes,
            token_type: default_token_type(),
        }
    }

    /// Whether the access token is unusable at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_SKEW_SECONDS) >= expiry,
            None => false,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map_or(false, |token| !token.is_empty())
    }

    /// Whether every scope in `required` was granted
    pub fn covers_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// Tokens never show up in logs or panics
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.can_refresh())
            .field("expiry", &self.expiry)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Durable storage for the single session shared by consecutive runs
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session; a missing or empty file yields `None`
    pub fn load(&self) -> DrivebackResult<Option<Session>> {
        read_json_optional(&self.path)
    }

    /// Persist the session, readable by the owner only
    pub fn save(&self, session: &Session) -> DrivebackResult<()> {
        write_json_atomic(&self.path, session)?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> DrivebackResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        DrivebackError::Io(format!(
            "Failed to restrict permissions on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> DrivebackResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scopes() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let session = Session::new("tok", None, Some(now + Duration::hours(1)), scopes());
        assert!(session.is_valid_at(now));
        assert!(session.is_expired_at(now + Duration::hours(2)));
    }

    #[test]
    fn test_expiry_skew() {
        let now = Utc::now();
        let session = Session::new("tok", None, Some(now + Duration::seconds(5)), scopes());
        assert!(session.is_expired_at(now));
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let session = Session::new("tok", None, None, scopes());
        assert!(session.is_valid_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_covers_scopes() {
        let session = Session::new("tok", None, None, scopes());
        assert!(session.covers_scopes(&["a".to_string()]));
        assert!(!session.covers_scopes(&["c".to_string()]));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session::new("secret-token", Some("secret-refresh".into()), None, scopes());
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("has_refresh_token: true"));
    }

    #[test]
    fn test_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());

        let expiry = Utc::now() + Duration::minutes(30);
        let session = Session::new("tok", Some("ref".into()), Some(expiry), scopes());
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.refresh_token.as_deref(), Some("ref"));
        assert_eq!(loaded.expiry, Some(expiry));
        assert_eq!(loaded.token_type, "Bearer");
    }

    #[cfg(unix)]
    #[test]
    fn test_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("token.json"));
        store.save(&Session::new("tok", None, None, scopes())).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_empty_file_is_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.json");
        std::fs::write(&path, "").unwrap();

        assert!(SessionStore::new(path).load().unwrap().is_none());
    }
}
