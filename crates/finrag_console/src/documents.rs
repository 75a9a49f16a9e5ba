//! Document panel: cached list plus upload/delete mutations.
//!
//! The list is never edited locally. Every successful mutation invalidates the
//! `documents` cache entry and the next load reflects the backend.

use std::path::PathBuf;
use std::sync::Arc;

use finrag_client::{ApiClient, ApiError, Document, QueryCache, ResourceKey, UploadedDocument};

/// What the list area shows. Exactly one branch applies at a time.
///
/// `refresh_error` is set when the last reload failed and the list shown is
/// the previous one.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentListView {
    Loading,
    Empty {
        refresh_error: Option<String>,
    },
    Documents {
        docs: Arc<Vec<Document>>,
        refresh_error: Option<String>,
    },
    Error(String),
}

pub struct DocumentPanel {
    client: ApiClient,
    cache: Arc<QueryCache>,
    uploads_in_flight: usize,
    upload_succeeded: bool,
    upload_message: Option<String>,
    deletes_in_flight: usize,
    last_error: Option<String>,
}

impl DocumentPanel {
    pub fn new(client: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self {
            client,
            cache,
            uploads_in_flight: 0,
            upload_succeeded: false,
            upload_message: None,
            deletes_in_flight: 0,
            last_error: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }

    /// Success banner state; cleared when the next upload starts.
    pub fn upload_succeeded(&self) -> bool {
        self.upload_succeeded
    }

    pub fn upload_message(&self) -> Option<&str> {
        self.upload_message.as_deref()
    }

    /// Shared by every row; there is no per-row tracking.
    pub fn is_deleting(&self) -> bool {
        self.deletes_in_flight > 0
    }

    /// Most recent mutation failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Serve the cached list, re-fetching when missing or invalidated.
    pub async fn load(&self) -> Result<Arc<Vec<Document>>, ApiError> {
        self.cache.get_or_fetch(|| self.client.list_documents()).await
    }

    pub fn list_view(&self) -> DocumentListView {
        let snap = self.cache.snapshot::<Vec<Document>>();
        match (snap.data, snap.error) {
            (Some(docs), refresh_error) if docs.is_empty() => {
                DocumentListView::Empty { refresh_error }
            }
            (Some(docs), refresh_error) => DocumentListView::Documents {
                docs,
                refresh_error,
            },
            (None, Some(error)) => DocumentListView::Error(error),
            (None, None) => DocumentListView::Loading,
        }
    }

    /// Mark `count` uploads as started.
    pub fn begin_upload(&mut self, count: usize) {
        self.uploads_in_flight += count;
        self.upload_succeeded = false;
        self.upload_message = None;
    }

    /// Record the results of one file selection.
    pub fn finish_upload(&mut self, results: &[Result<UploadedDocument, ApiError>]) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(results.len());

        let mut uploaded = 0;
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(doc) => {
                    uploaded += 1;
                    tracing::info!(id = doc.id, file = %doc.filename, chunks = doc.num_chunks, "document uploaded");
                    self.upload_message = doc.message.clone();
                }
                Err(e) => errors.push(e.to_string()),
            }
        }
        if uploaded > 0 {
            self.upload_succeeded = true;
            self.cache.invalidate(ResourceKey::Documents);
        }
        self.last_error = if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        };
    }

    pub fn begin_delete(&mut self) {
        self.deletes_in_flight += 1;
    }

    pub fn finish_delete(&mut self, id: i64, result: &Result<serde_json::Value, ApiError>) {
        self.deletes_in_flight = self.deletes_in_flight.saturating_sub(1);
        match result {
            Ok(_) => {
                tracing::info!(id, "document deleted");
                self.last_error = None;
                self.cache.invalidate(ResourceKey::Documents);
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    /// Upload every path as an independent request, then reload the list.
    pub async fn upload_paths(
        &mut self,
        paths: &[PathBuf],
    ) -> Vec<Result<UploadedDocument, ApiError>> {
        self.begin_upload(paths.len());
        let results = self.client.upload_paths(paths).await;
        self.finish_upload(&results);
        self.reload().await;
        results
    }

    /// Delete a document, then reload the list.
    pub async fn delete(&mut self, id: i64) -> Result<serde_json::Value, ApiError> {
        self.begin_delete();
        let result = self.client.delete_document(id).await;
        self.finish_delete(id, &result);
        self.reload().await;
        result
    }

    /// Re-fetch if stale; failures are kept in the cache for [`Self::list_view`].
    pub async fn reload(&self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "document list refresh failed");
        }
    }
}
