//! driveback - Directory snapshots shipped to Google Drive
//!
//! This library provides the backup lifecycle behind the `driveback`
//! binary: archive a directory into a `.tar.gz`, upload it into a named
//! Drive folder and keep only the newest archives there.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, persisted settings and the per-run backup configuration
//! - `error`: Custom error types
//! - `storage`: Atomic JSON persistence helpers
//! - `auth`: OAuth session loading, refresh and interactive authorization
//! - `archive`: Timestamped tarball production
//! - `remote`: The remote store seam and its Google Drive implementation
//! - `backup`: Folder resolution, retention and the run coordinator
//! - `cli`: Argument parsing and the command handler
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use driveback::config::{DrivebackPaths, Settings};
//!
//! let paths = DrivebackPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod archive;
pub mod auth;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod storage;

pub use error::{DrivebackError, DrivebackResult};
