//! In-process stand-in for the Financial RAG backend, built on axum.
//! Records every call so tests can count requests. No mocks.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
pub struct BackendState {
    pub docs: Vec<Value>,
    pub next_id: i64,
    pub chat_requests: Vec<Value>,
    pub chat_reply: Option<Value>,
    pub chat_error: Option<String>,
    pub uploads: Vec<(String, String)>,
    pub list_calls: usize,
    pub delete_calls: usize,
    pub metrics: Value,
    pub metrics_calls: usize,
}

/// Shared backend state; clone freely.
#[derive(Clone, Default)]
pub struct Backend(pub Arc<Mutex<BackendState>>);

impl Backend {
    pub fn new() -> Self {
        let backend = Backend::default();
        backend.with(|s| {
            s.next_id = 1;
            s.metrics = json!({});
        });
        backend
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }

    pub fn add_document(&self, filename: &str, file_type: &str, num_chunks: u64) -> i64 {
        self.with(|s| {
            let id = s.next_id;
            s.next_id += 1;
            s.docs.push(json!({
                "id": id,
                "filename": filename,
                "file_type": file_type,
                "num_chunks": num_chunks,
                "uploaded_at": "2024-05-01T10:00:00",
            }));
            id
        })
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/chat/", post(chat))
            .route("/documents/upload", post(upload))
            .route("/documents/list", get(list))
            .route("/documents/{id}", delete(remove))
            .route("/metrics/summary", get(metrics))
            .route("/health", get(health))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral port from the current tokio runtime.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Serve from a dedicated thread, for blocking tests that run binaries.
    pub fn spawn_in_thread(&self) -> String {
        let backend = self.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, backend.router()).await.unwrap();
            });
        });
        format!("http://{}", rx.recv().unwrap())
    }
}

fn failure(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

async fn chat(State(b): State<Backend>, Json(req): Json<Value>) -> Reply {
    b.with(|s| {
        s.chat_requests.push(req.clone());
        if let Some(detail) = &s.chat_error {
            return Err(failure(StatusCode::INTERNAL_SERVER_ERROR, detail));
        }
        let session_id = req["session_id"].clone();
        let mut reply = s.chat_reply.clone().unwrap_or_else(|| {
            json!({
                "response": format!("echo: {}", req["message"].as_str().unwrap_or_default()),
                "sources": ["Agent used: research"],
            })
        });
        reply["session_id"] = session_id;
        Ok(Json(reply))
    })
}

async fn upload(State(b): State<Backend>, mut multipart: Multipart) -> Reply {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        b.with(|s| s.uploads.push((filename.clone(), content_type)));

        let file_type = if filename.ends_with(".pdf") {
            "pdf"
        } else if filename.ends_with(".txt") {
            "text"
        } else {
            return Err(failure(
                StatusCode::BAD_REQUEST,
                "Unsupported file type. Use PDF or TXT.",
            ));
        };
        let num_chunks = (bytes.len() as u64 / 10) + 1;
        let id = b.add_document(&filename, file_type, num_chunks);
        return Ok(Json(json!({
            "id": id,
            "filename": filename,
            "file_type": file_type,
            "num_chunks": num_chunks,
            "message": format!("Successfully processed {} chunks", num_chunks),
        })));
    }
    Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "file field missing"))
}

async fn list(State(b): State<Backend>) -> Reply {
    b.with(|s| {
        s.list_calls += 1;
        Ok(Json(Value::Array(s.docs.clone())))
    })
}

async fn remove(State(b): State<Backend>, Path(id): Path<i64>) -> Reply {
    b.with(|s| {
        s.delete_calls += 1;
        let pos = s.docs.iter().position(|d| d["id"] == json!(id));
        match pos {
            Some(pos) => {
                let doc = s.docs.remove(pos);
                Ok(Json(json!({
                    "message": format!("Document {} deleted successfully", doc["filename"].as_str().unwrap_or_default()),
                })))
            }
            None => Err(failure(StatusCode::NOT_FOUND, "Document not found")),
        }
    })
}

async fn metrics(State(b): State<Backend>) -> Reply {
    b.with(|s| {
        s.metrics_calls += 1;
        Ok(Json(s.metrics.clone()))
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
