//! OAuth 2.0 token endpoint for installed applications

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::secrets::ClientSecrets;
use super::session::Session;
use crate::error::{DrivebackError, DrivebackResult};

/// The three token operations the session manager depends on
pub trait TokenEndpoint {
    /// URL the operator opens to grant access
    fn authorization_url(&self, scopes: &[String]) -> DrivebackResult<String>;

    /// Trade a one-time authorization code for a session
    fn exchange_code(&self, code: &str, scopes: &[String]) -> DrivebackResult<Session>;

    /// Mint a new access token from the session's refresh token
    fn refresh(&self, session: &Session) -> DrivebackResult<Session>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    /// Build a session, keeping `previous` values the server chose not to resend
    fn into_session(
        self,
        now: DateTime<Utc>,
        previous_refresh: Option<&str>,
        requested_scopes: &[String],
    ) -> Session {
        let scopes = match self.scope.as_deref() {
            Some(scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_string).collect()
            }
            _ => requested_scopes.to_vec(),
        };

        let mut session = Session::new(
            self.access_token,
            self.refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous_refresh.map(str::to_string)),
            self.expires_in.map(|secs| now + Duration::seconds(secs)),
            scopes,
        );
        if let Some(token_type) = self.token_type {
            session.token_type = token_type;
        }
        session
    }
}

/// Talks to the Google OAuth endpoints over blocking HTTP
pub struct OAuthClient {
    secrets: ClientSecrets,
    redirect_uri: String,
    http: Client,
}

impl OAuthClient {
    pub fn new(secrets: ClientSecrets, redirect_uri: impl Into<String>) -> DrivebackResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| DrivebackError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            secrets,
            redirect_uri: redirect_uri.into(),
            http,
        })
    }

    fn post_token(&self, form: &[(&str, &str)]) -> DrivebackResult<TokenResponse> {
        let response = self
            .http
            .post(&self.secrets.token_uri)
            .form(form)
            .send()
            .map_err(|e| DrivebackError::Transport(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<TokenResponse>().map_err(|e| {
                DrivebackError::Transport(format!("Malformed token response: {}", e))
            });
        }

        let body = response.text().unwrap_or_default();
        Err(token_error(status.as_u16(), &body))
    }
}

/// Map a failed token call to the error taxonomy
fn token_error(status: u16, body: &str) -> DrivebackError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) if status == 400 || status == 401 => {
            let message = match err.error_description {
                Some(description) => format!("{} ({})", err.error, description),
                None => err.error,
            };
            DrivebackError::Auth(message)
        }
        _ => DrivebackError::Transport(format!(
            "Token endpoint returned HTTP {}: {}",
            status, body
        )),
    }
}

impl TokenEndpoint for OAuthClient {
    fn authorization_url(&self, scopes: &[String]) -> DrivebackResult<String> {
        let scope = scopes.join(" ");
        let url = Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| DrivebackError::Config(format!("Invalid auth_uri: {}", e)))?;

        Ok(url.into())
    }

    fn exchange_code(&self, code: &str, scopes: &[String]) -> DrivebackResult<Session> {
        tracing::debug!("Exchanging authorization code");
        let response = self.post_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])?;

        Ok(response.into_session(Utc::now(), None, scopes))
    }

    fn refresh(&self, session: &Session) -> DrivebackResult<Session> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| DrivebackError::Auth("Session has no refresh token".into()))?;

        tracing::debug!("Refreshing access token");
        let response = self.post_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
        ])?;

        Ok(response.into_session(Utc::now(), Some(refresh_token), &session.scopes))
    }
}
