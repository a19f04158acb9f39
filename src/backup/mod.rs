//! Backup lifecycle for driveback
//!
//! Ties the session, the archive and the remote store together.
//!
//! # Architecture
//!
//! - `resolve_folder`: maps the `-g` folder name to a remote id
//! - `enforce_retention`: deletes the oldest archives beyond `keep_count`
//! - `UploadCoordinator`: runs the whole sequence
//!
//! # Sequence
//!
//! 1. Obtain a session (reuse, refresh or authorize)
//! 2. Produce the local archive
//! 3. Resolve the remote folder; a missing folder aborts before anything is deleted
//! 4. Prune old archives
//! 5. Upload the new archive in resumable chunks
//! 6. Remove the local archive
//!
//! Pruning happens before the upload, so after a run the folder holds
//! `keep_count + 1` archives.
//!
//! # Example
//!
//! ```rust,ignore
//! use driveback::backup::UploadCoordinator;
//!
//! let coordinator = UploadCoordinator::new(&config, producer);
//! let report = coordinator.run(&mut session_manager, &DriveConnector::new(chunk, mime))?;
//! println!("Uploaded {}", report.archive_name);
//! ```

mod coordinator;
mod resolver;
mod retention;

pub use coordinator::{BackupReport, UploadCoordinator};
pub use resolver::resolve_folder;
pub use retention::enforce_retention;
