//! Path management for driveback
//!
//! Resolves where the OAuth client secrets, the persisted session and the
//! settings file live.
//!
//! ## Path Resolution Order
//!
//! 1. `DRIVEBACK_HOME` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/driveback` or `~/.config/driveback`
//! 3. Windows: `%APPDATA%\driveback`

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::DrivebackError;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "DRIVEBACK_HOME";

const APP_DIR: &str = "driveback";

/// Manages all paths used by driveback
#[derive(Debug, Clone)]
pub struct DrivebackPaths {
    /// Base directory for all driveback files
    base_dir: PathBuf,
    credentials_override: Option<PathBuf>,
    token_override: Option<PathBuf>,
}

impl DrivebackPaths {
    /// Create a new DrivebackPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, DrivebackError> {
        let base_dir = match std::env::var_os(HOME_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self::with_base_dir(base_dir))
    }

    /// Create DrivebackPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            credentials_override: None,
            token_override: None,
        }
    }

    /// Use an explicit client secrets file instead of the one in the base directory
    pub fn with_credentials_file(mut self, path: Option<PathBuf>) -> Self {
        self.credentials_override = path;
        self
    }

    /// Use an explicit session file instead of the one in the base directory
    pub fn with_token_file(mut self, path: Option<PathBuf>) -> Self {
        self.token_override = path;
        self
    }

    /// Get the base directory (~/.config/driveback/ or equivalent)
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the OAuth client secrets downloaded from the Google console
    pub fn credentials_file(&self) -> PathBuf {
        self.credentials_override
            .clone()
            .unwrap_or_else(|| self.base_dir.join("credentials.json"))
    }

    /// Get the path to the persisted session
    pub fn token_file(&self) -> PathBuf {
        self.token_override
            .clone()
            .unwrap_or_else(|| self.base_dir.join("token.json"))
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), DrivebackError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| DrivebackError::Io(format!("Failed to create base directory: {}", e)))
    }
}

/// Resolve the default base directory based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, DrivebackError> {
    // XDG_CONFIG_HOME wins over ~/.config, also on macOS
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(config_home).join(APP_DIR));
    }

    let base = BaseDirs::new()
        .ok_or_else(|| DrivebackError::Config("Could not determine home directory".into()))?;
    Ok(base.home_dir().join(".config").join(APP_DIR))
}

/// Resolve the default base directory based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, DrivebackError> {
    let base = BaseDirs::new()
        .ok_or_else(|| DrivebackError::Config("Could not determine APPDATA directory".into()))?;
    Ok(base.config_dir().join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.credentials_file(),
            temp_dir.path().join("credentials.json")
        );
        assert_eq!(paths.token_file(), temp_dir.path().join("token.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(HOME_ENV, temp_dir.path());
        let paths = DrivebackPaths::new().unwrap();
        env::remove_var(HOME_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().to_path_buf())
            .with_credentials_file(Some(PathBuf::from("/etc/driveback/client.json")))
            .with_token_file(None);

        assert_eq!(
            paths.credentials_file(),
            PathBuf::from("/etc/driveback/client.json")
        );
        assert_eq!(paths.token_file(), temp_dir.path().join("token.json"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().join("nested").join("cfg"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
    }
}
