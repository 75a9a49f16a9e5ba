//! HTTP client: one method per backend capability (chat, documents, metrics).

use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use reqwest::multipart::Part;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::DEFAULT_BASE_URL;
use crate::messages::{
    ChatRequest, ChatResponse, Document, ErrorBody, HealthStatus, MetricsSnapshot,
    UploadedDocument,
};

/// Request failure. Every API call surfaces one of these instead of swallowing it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {detail}")]
    Status {
        url: String,
        status: StatusCode,
        detail: String,
    },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot prepare upload of {file}: {source}")]
    Upload {
        file: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status when the backend answered with a non-success code.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A file selected for upload: display name plus contents.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk; the upload name is the path's final component.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::File {
            path: path.display().to_string(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    /// MIME type inferred from the extension.
    pub fn mime_type(&self) -> &'static str {
        match extension(&self.file_name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Whether the backend ingests this kind of file (PDF or plain text).
    pub fn is_supported(&self) -> bool {
        matches!(extension(&self.file_name).as_deref(), Some("pdf") | Some("txt"))
    }
}

/// Multipart body for one file.
fn file_part(file_name: String, bytes: Vec<u8>, mime: &str) -> Result<Part, ApiError> {
    Part::bytes(bytes)
        .file_name(file_name.clone())
        .mime_str(mime)
        .map_err(|e| ApiError::Upload {
            file: file_name,
            source: e,
        })
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Financial RAG backend client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    /// Client for the backend at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = self.url(path);
        let builder = self.http.request(method, &url);
        (url, builder)
    }

    /// `POST /chat/`: ask a question within a session.
    pub async fn send_message(
        &self,
        message: &str,
        session_id: &str,
    ) -> Result<ChatResponse, ApiError> {
        let (url, req) = self.request(Method::POST, "/chat/");
        tracing::debug!(%url, session_id, "sending chat message");
        let req = req.json(&ChatRequest {
            message,
            session_id,
        });
        self.execute(url, req).await
    }

    /// `POST /documents/upload`: multipart upload under the `file` field.
    pub async fn upload_document(&self, file: UploadFile) -> Result<UploadedDocument, ApiError> {
        let (url, req) = self.request(Method::POST, "/documents/upload");
        if !file.is_supported() {
            tracing::warn!(file = %file.file_name, "backend only ingests .pdf and .txt files");
        }
        tracing::debug!(%url, file = %file.file_name, size = file.bytes.len(), "uploading document");
        let mime = file.mime_type();
        let part = file_part(file.file_name, file.bytes, mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.execute(url, req.multipart(form)).await
    }

    /// Upload each path as its own request, all in flight at once.
    ///
    /// Results line up with `paths`. A file that cannot be read fails on its
    /// own without a request; the others are unaffected.
    pub async fn upload_paths(
        &self,
        paths: &[PathBuf],
    ) -> Vec<Result<UploadedDocument, ApiError>> {
        join_all(paths.iter().map(|path| async move {
            let file = UploadFile::from_path(path).await?;
            self.upload_document(file).await
        }))
        .await
    }

    /// `GET /documents/list`: documents in backend order.
    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let (url, req) = self.request(Method::GET, "/documents/list");
        tracing::debug!(%url, "listing documents");
        self.execute(url, req).await
    }

    /// `DELETE /documents/{id}`: the payload is backend-defined.
    pub async fn delete_document(&self, id: i64) -> Result<serde_json::Value, ApiError> {
        let (url, req) = self.request(Method::DELETE, &format!("/documents/{}", id));
        tracing::debug!(%url, id, "deleting document");
        self.execute(url, req).await
    }

    /// `GET /metrics/summary`.
    pub async fn fetch_metrics_summary(&self) -> Result<MetricsSnapshot, ApiError> {
        let (url, req) = self.request(Method::GET, "/metrics/summary");
        tracing::debug!(%url, "fetching metrics summary");
        self.execute(url, req).await
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let (url, req) = self.request(Method::GET, "/health");
        self.execute(url, req).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: String,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "request failed");
            ApiError::Transport {
                url: url.clone(),
                source: e,
            }
        })?;
        decode(url, resp).await
    }
}

async fn decode<T: DeserializeOwned>(url: String, resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(|e| ApiError::Transport {
        url: url.clone(),
        source: e,
    })?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&body)
            .map(|b| b.detail_text())
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
        tracing::warn!(%url, %status, %detail, "backend returned an error");
        return Err(ApiError::Status {
            url,
            status,
            detail,
        });
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        url,
        message: e.to_string(),
    })
}
