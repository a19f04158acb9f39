//! Google Drive v3 implementation of the remote store

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, LOCATION, RANGE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::resumable::{content_range, resume_offset};
use super::{RemoteConnector, RemoteEntry, RemoteFolder, RemoteStore};
use crate::archive::Archive;
use crate::auth::Session;
use crate::error::{DrivebackError, DrivebackResult};

/// Metadata endpoint base
pub const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
/// Media upload endpoint base
pub const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList<T> {
    #[serde(default = "Vec::new")]
    files: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

/// Creates [`DriveClient`]s for a session
#[derive(Debug, Clone)]
pub struct DriveConnector {
    api_base: String,
    upload_base: String,
    chunk_size: usize,
    mime_type: String,
}

impl DriveConnector {
    pub fn new(chunk_size: usize, mime_type: impl Into<String>) -> Self {
        Self {
            api_base: DRIVE_API.to_string(),
            upload_base: DRIVE_UPLOAD_API.to_string(),
            chunk_size,
            mime_type: mime_type.into(),
        }
    }

    /// Point the connector at other metadata and upload endpoints
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.upload_base = upload_base.into();
        self
    }
}

impl RemoteConnector for DriveConnector {
    type Store = DriveClient;

    fn connect(&self, session: &Session) -> DrivebackResult<DriveClient> {
        DriveClient::new(session, self.clone())
    }
}

/// Blocking Drive v3 client bound to one access token
pub struct DriveClient {
    http: Client,
    authorization: String,
    config: DriveConnector,
}

impl DriveClient {
    pub fn new(session: &Session, config: DriveConnector) -> DrivebackResult<Self> {
        // 308 is the resumable protocol's "keep going", not a redirect
        let http = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| DrivebackError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            authorization: session.authorization_header(),
            config,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).header(AUTHORIZATION, &self.authorization)
    }

    /// Collect every page of a `files.list` call
    fn list_pages<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> DrivebackResult<Vec<T>> {
        let url = format!("{}/files", self.config.api_base);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.get(&url).query(query);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let page: FileList<T> = expect_success(request.send()?, "List files")?.json()?;
            items.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Open a resumable upload session and return its URI
    fn start_upload(&self, parent_id: &str, archive: &Archive) -> DrivebackResult<String> {
        let url = format!("{}/files", self.config.upload_base);
        let metadata = json!({
            "name": archive.name(),
            "parents": [parent_id],
            "mimeType": self.config.mime_type,
        });

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.authorization)
            .header("X-Upload-Content-Type", &self.config.mime_type)
            .header("X-Upload-Content-Length", archive.size_bytes())
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .json(&metadata)
            .send()?;
        let response = expect_success(response, "Start upload")?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                DrivebackError::Transport("Upload session response has no Location header".into())
            })
    }

    fn put_chunk(
        &self,
        session_uri: &str,
        range: String,
        body: Vec<u8>,
    ) -> DrivebackResult<Response> {
        Ok(self
            .http
            .put(session_uri)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_RANGE, range)
            .body(body)
            .send()?)
    }
}

impl RemoteStore for DriveClient {
    fn list_all(&self) -> DrivebackResult<Vec<RemoteFolder>> {
        tracing::debug!("Listing all remote entries");
        self.list_pages(&[("fields", "nextPageToken, files(id, name)")])
    }

    fn list_children(&self, parent_id: &str) -> DrivebackResult<Vec<RemoteEntry>> {
        tracing::debug!(parent_id, "Listing folder contents");
        let q = format!("'{}' in parents and trashed = false", parent_id.replace('\'', "\\'"));
        self.list_pages(&[
            ("q", q.as_str()),
            ("orderBy", "createdTime asc"),
            (
                "fields",
                "nextPageToken, files(id, name, parents, createdTime)",
            ),
        ])
    }

    fn delete(&self, entry_id: &str) -> DrivebackResult<()> {
        let url = format!("{}/files/{}", self.config.api_base, entry_id);
        let response = self
            .http
            .delete(&url)
            .header(AUTHORIZATION, &self.authorization)
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!(entry_id, "Entry already gone, treating delete as done");
            return Ok(());
        }
        expect_success(response, "Delete file")?;
        Ok(())
    }

    fn upload(&self, parent_id: &str, archive: &Archive) -> DrivebackResult<String> {
        let session_uri = self.start_upload(parent_id, archive)?;
        let total = archive.size_bytes();
        let mut file = File::open(archive.path()).map_err(|e| {
            DrivebackError::Io(format!("Failed to open {}: {}", archive.path().display(), e))
        })?;

        let mut offset = 0u64;
        loop {
            let response = if total == 0 {
                self.put_chunk(&session_uri, "bytes */0".to_string(), Vec::new())?
            } else {
                file.seek(SeekFrom::Start(offset))?;
                let mut chunk = Vec::with_capacity(self.config.chunk_size);
                (&mut file)
                    .take(self.config.chunk_size as u64)
                    .read_to_end(&mut chunk)?;
                if chunk.is_empty() {
                    return Err(DrivebackError::Io(format!(
                        "{} shrank during upload",
                        archive.path().display()
                    )));
                }

                let end = offset + chunk.len() as u64 - 1;
                tracing::debug!(offset, end, total, "Sending chunk");
                self.put_chunk(&session_uri, content_range(offset, end, total), chunk)?
            };

            match response.status().as_u16() {
                200 | 201 => {
                    let created: CreatedFile = response.json()?;
                    return Ok(created.id);
                }
                308 => {
                    let held = response
                        .headers()
                        .get(RANGE)
                        .and_then(|value| value.to_str().ok());
                    offset = resume_offset(held)?;
                    if total == 0 || offset >= total {
                        return Err(DrivebackError::Transport(
                            "Server holds the whole upload but did not finish it".into(),
                        ));
                    }
                }
                _ => {
                    expect_success(response, "Upload chunk")?;
                    return Err(DrivebackError::Transport(
                        "Upload chunk returned an unexpected status".into(),
                    ));
                }
            }
        }
    }
}

/// Turn a non-2xx response into a transport error carrying the body
fn expect_success(response: Response, what: &str) -> DrivebackResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(DrivebackError::Transport(format!(
        "{} failed with HTTP {}: {}",
        what,
        status,
        body.trim()
    )))
}
