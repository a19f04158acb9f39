//! OAuth client secrets in the format downloaded from the Google Cloud console

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{DrivebackError, DrivebackResult};
use crate::storage::file_io::read_json_required;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Identity of the OAuth client this tool authorizes as
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ClientSecrets {
    #[zeroize(skip)]
    pub client_id: String,

    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    #[zeroize(skip)]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    #[zeroize(skip)]
    pub token_uri: String,

    #[serde(default)]
    #[zeroize(skip)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Top-level wrapper: desktop clients are keyed "installed", web clients "web"
#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load client secrets from a `credentials.json` file
    pub fn load(path: &Path) -> DrivebackResult<Self> {
        if !path.exists() {
            return Err(DrivebackError::Config(format!(
                "OAuth client secrets not found at {}. Download credentials.json for a \
                 desktop OAuth client from the Google Cloud console.",
                path.display()
            )));
        }

        let file: ClientSecretsFile = read_json_required(path)?;
        Self::from_file(file).ok_or_else(|| {
            DrivebackError::Config(format!(
                "{} has neither an \"installed\" nor a \"web\" client section",
                path.display()
            ))
        })
    }

    /// Parse client secrets from JSON text
    pub fn from_json(json: &str) -> DrivebackResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)?;
        Self::from_file(file).ok_or_else(|| {
            DrivebackError::Config("Client secrets have no client section".into())
        })
    }

    fn from_file(file: ClientSecretsFile) -> Option<Self> {
        file.installed.or(file.web)
    }
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "backup-project",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shhh",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
        }
    }"#;

    #[test]
    fn test_parse_installed() {
        let secrets = ClientSecrets::from_json(INSTALLED).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shhh");
        assert_eq!(secrets.redirect_uris.len(), 2);
    }

    #[test]
    fn test_parse_web_with_defaults() {
        let secrets =
            ClientSecrets::from_json(r#"{"web": {"client_id": "id", "client_secret": "s"}}"#)
                .unwrap();
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(secrets.auth_uri, "https://accounts.google.com/o/oauth2/auth");
    }

    #[test]
    fn test_no_section_is_config_error() {
        let err = ClientSecrets::from_json(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, DrivebackError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ClientSecrets::load(&temp_dir.path().join("credentials.json")).unwrap_err();
        assert!(err.to_string().contains("credentials.json"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secrets = ClientSecrets::from_json(INSTALLED).unwrap();
        assert!(!format!("{:?}", secrets).contains("shhh"));
    }
}
