//! Credential session management
//!
//! A run needs exactly one usable OAuth session. The stored session is reused
//! while it is valid, refreshed silently once it expires, and only when neither
//! works does the operator get asked to authorize in a browser.
//!
//! # Components
//!
//! - `Session` / `SessionStore`: the token record and its JSON file
//! - `ClientSecrets`: the OAuth client identity from `credentials.json`
//! - `TokenEndpoint` / `OAuthClient`: code exchange and refresh over HTTP
//! - `CodePrompt` / `LinePrompt`: where the flow waits for the operator's code
//! - `SessionManager`: the state machine tying them together
//!
//! # Example
//!
//! ```rust,ignore
//! use driveback::auth::{ClientSecrets, LinePrompt, OAuthClient, SessionManager, SessionSource, SessionStore};
//!
//! let secrets = ClientSecrets::load(&paths.credentials_file())?;
//! let endpoint = OAuthClient::new(secrets, &settings.redirect_uri)?;
//! let mut manager = SessionManager::new(
//!     SessionStore::new(paths.token_file()),
//!     endpoint,
//!     LinePrompt::stdio(),
//!     settings.scopes.clone(),
//! );
//! let session = manager.obtain_session()?;
//! ```

mod endpoint;
mod manager;
mod prompt;
mod secrets;
mod session;

pub use endpoint::{OAuthClient, TokenEndpoint};
pub use manager::{PendingAuthorization, SessionManager, SessionState};
pub use prompt::{CodePrompt, LinePrompt};
pub use secrets::ClientSecrets;
pub use session::{Session, SessionStore};

use crate::error::DrivebackResult;

/// Anything that can hand the coordinator a usable session
pub trait SessionSource {
    /// Return a non-expired session or fail
    fn obtain_session(&mut self) -> DrivebackResult<Session>;
}
