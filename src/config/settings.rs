//! User settings for driveback
//!
//! Tunables that rarely change between runs: OAuth scopes, upload chunking,
//! archive naming and the default log level.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::DrivebackPaths;
use crate::error::DrivebackError;
use crate::storage::file_io::{read_json_optional, write_json_atomic};

/// Drive requires resumable chunks to be a multiple of this size
pub const UPLOAD_CHUNK_GRANULARITY: usize = 256 * 1024;

/// User settings for driveback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// OAuth scopes requested during authorization
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Redirect URI sent with the authorization request
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Size of each resumable upload chunk in bytes
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,

    /// chrono format string for archive names (".tar.gz" is appended)
    #[serde(default = "default_archive_name_format")]
    pub archive_name_format: String,

    /// MIME type recorded for uploaded archives
    #[serde(default = "default_archive_mime_type")]
    pub archive_mime_type: String,

    /// Log level used when neither RUST_LOG nor -v is given
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/drive.file".to_string(),
        "https://www.googleapis.com/auth/drive.metadata".to_string(),
    ]
}

fn default_redirect_uri() -> String {
    "urn:ietf:wg:oauth:2.0:oob".to_string()
}

fn default_upload_chunk_size() -> usize {
    UPLOAD_CHUNK_GRANULARITY
}

fn default_archive_name_format() -> String {
    "%d-%m-%Y:%H:%M:%S".to_string()
}

fn default_archive_mime_type() -> String {
    "application/gzip".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            scopes: default_scopes(),
            redirect_uri: default_redirect_uri(),
            upload_chunk_size: default_upload_chunk_size(),
            archive_name_format: default_archive_name_format(),
            archive_mime_type: default_archive_mime_type(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &DrivebackPaths) -> Result<Self, DrivebackError> {
        let settings_path = paths.settings_file();

        let settings: Settings = read_json_optional(&settings_path)
            .map_err(|e| DrivebackError::Config(format!("Failed to load settings: {}", e)))?
            // Don't save yet - let caller decide when to persist
            .unwrap_or_default();

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &DrivebackPaths) -> Result<(), DrivebackError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Reject values the remote or the archive producer cannot work with
    pub fn validate(&self) -> Result<(), DrivebackError> {
        if self.scopes.is_empty() {
            return Err(DrivebackError::Config(
                "At least one OAuth scope is required".into(),
            ));
        }

        if self.upload_chunk_size == 0 || self.upload_chunk_size % UPLOAD_CHUNK_GRANULARITY != 0
        {
            return Err(DrivebackError::Config(format!(
                "upload_chunk_size must be a positive multiple of {} bytes, got {}",
                UPLOAD_CHUNK_GRANULARITY, self.upload_chunk_size
            )));
        }

        if self.archive_name_format.trim().is_empty() {
            return Err(DrivebackError::Config(
                "archive_name_format must not be empty".into(),
            ));
        }

        if StrftimeItems::new(&self.archive_name_format).any(|item| matches!(item, Item::Error)) {
            return Err(DrivebackError::Config(format!(
                "archive_name_format is not a valid strftime format: {}",
                self.archive_name_format
            )));
        }

        if self.archive_name_format.contains('/') {
            return Err(DrivebackError::Config(
                "archive_name_format must not contain '/'".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.upload_chunk_size, 262_144);
        assert_eq!(settings.archive_name_format, "%d-%m-%Y:%H:%M:%S");
        assert_eq!(settings.scopes.len(), 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings.archive_mime_type, "application/gzip");
        assert!(!paths.settings_file().exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.upload_chunk_size = 4 * UPLOAD_CHUNK_GRANULARITY;
        settings.log_level = "debug".into();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.upload_chunk_size, 1_048_576);
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DrivebackPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"log_level": "info"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.log_level, "info");
        assert_eq!(loaded.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
    }

    #[test]
    fn test_unaligned_chunk_size_rejected() {
        let settings = Settings {
            upload_chunk_size: 100_000,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("upload_chunk_size"));
    }

    #[test]
    fn test_bad_name_format_rejected() {
        let settings = Settings {
            archive_name_format: "%Q-%d".into(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_scopes_rejected() {
        let settings = Settings {
            scopes: Vec::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
