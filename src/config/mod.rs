//! Configuration module for driveback
//!
//! This module provides configuration management including:
//! - Config directory and credential file resolution
//! - Persisted settings (scopes, chunking, naming)
//! - The immutable per-run backup configuration

pub mod job;
pub mod paths;
pub mod settings;

pub use job::{BackupConfig, RetentionPolicy};
pub use paths::DrivebackPaths;
pub use settings::Settings;
