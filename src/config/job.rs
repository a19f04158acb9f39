//! Per-run backup configuration
//!
//! Built once from validated command line arguments and passed by reference
//! into the upload coordinator.

use std::path::{Path, PathBuf};

use crate::error::DrivebackError;

/// How many archives to keep in the remote folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetentionPolicy {
    keep_count: u32,
}

impl RetentionPolicy {
    /// Keep the `keep_count` newest archives; zero disables pruning
    pub fn keep(keep_count: u32) -> Self {
        Self { keep_count }
    }

    /// Never prune
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Build from the raw `-f` value; zero, negative or absent means no pruning
    pub fn from_flag(value: Option<i64>) -> Self {
        match value {
            Some(n) if n > 0 => Self::keep(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => Self::unlimited(),
        }
    }

    pub fn keep_count(&self) -> u32 {
        self.keep_count
    }

    pub fn is_pruning(&self) -> bool {
        self.keep_count > 0
    }

    /// Number of entries to delete out of `total`
    pub fn excess(&self, total: usize) -> usize {
        if !self.is_pruning() {
            return 0;
        }
        total.saturating_sub(self.keep_count as usize)
    }
}

/// Immutable configuration for one backup run
#[derive(Debug, Clone)]
pub struct BackupConfig {
    source: PathBuf,
    folder_name: String,
    retention: RetentionPolicy,
    work_dir: PathBuf,
}

impl BackupConfig {
    /// Validate raw argument values into a run configuration
    pub fn new(
        source: Option<PathBuf>,
        folder_name: Option<String>,
        keep_count: Option<i64>,
        work_dir: Option<PathBuf>,
    ) -> Result<Self, DrivebackError> {
        let source = source.filter(|s| !s.as_os_str().is_empty()).ok_or_else(|| {
            DrivebackError::Usage("The source directory (\"-s\") is not defined.".into())
        })?;

        let folder_name = folder_name.filter(|g| !g.is_empty()).ok_or_else(|| {
            DrivebackError::Usage("The gdrive directory (\"-g\") is not defined.".into())
        })?;

        Ok(Self {
            source,
            folder_name,
            retention: RetentionPolicy::from_flag(keep_count),
            work_dir: work_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Directory where the archive is staged before upload
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
