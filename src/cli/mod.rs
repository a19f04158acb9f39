//! CLI command handlers
//!
//! Bridges clap argument parsing with the backup lifecycle.

pub mod backup;

pub use backup::{handle_backup, BackupArgs};
