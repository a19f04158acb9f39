//! Remote object store capability
//!
//! The backup core only needs four operations from the remote side: list
//! everything by name, list one folder's children oldest first, delete by id,
//! and create a file under a folder from local content. Any store offering
//! those can stand in for Google Drive.

mod drive;
mod resumable;

pub use drive::{DriveClient, DriveConnector};
pub use resumable::{content_range, resume_offset};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::archive::Archive;
use crate::auth::Session;
use crate::error::DrivebackResult;

/// Any named entry visible to the session (folders included)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
}

/// A file stored inside a remote folder
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
}

/// The four operations the backup lifecycle needs from a remote store
pub trait RemoteStore {
    /// Every entry visible to the session, in listing order
    fn list_all(&self) -> DrivebackResult<Vec<RemoteFolder>>;

    /// Non-trashed children of `parent_id`, oldest creation time first
    fn list_children(&self, parent_id: &str) -> DrivebackResult<Vec<RemoteEntry>>;

    /// Permanently delete an entry; deleting a missing entry succeeds
    fn delete(&self, entry_id: &str) -> DrivebackResult<()>;

    /// Upload `archive` as a new entry under `parent_id`, returning its id
    fn upload(&self, parent_id: &str, archive: &Archive) -> DrivebackResult<String>;
}

/// Builds an authenticated store handle from a session
pub trait RemoteConnector {
    type Store: RemoteStore;

    fn connect(&self, session: &Session) -> DrivebackResult<Self::Store>;
}
