//! HTTP wire types for the Financial RAG backend. Client ↔ server JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix the backend puts in front of the agent name in `sources[0]`.
pub const AGENT_SOURCE_PREFIX: &str = "Agent used: ";

/// Client → server: `POST /chat/`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

/// Server → client: chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ChatResponse {
    /// Agent name derived from the first source entry.
    ///
    /// Returns `"unknown"` when there are no sources or the stripped entry is empty.
    pub fn agent_label(&self) -> String {
        agent_label_from_sources(&self.sources)
    }
}

/// Strip [`AGENT_SOURCE_PREFIX`] off `sources[0]`; `"unknown"` when absent or empty.
pub fn agent_label_from_sources(sources: &[String]) -> String {
    let label = sources
        .first()
        .map(|s| s.replacen(AGENT_SOURCE_PREFIX, "", 1))
        .unwrap_or_default();
    if label.is_empty() {
        "unknown".to_string()
    } else {
        label
    }
}

/// One row of `GET /documents/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub num_chunks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

/// Server → client: `POST /documents/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub num_chunks: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-agent query counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentUsage {
    #[serde(default)]
    pub research: Option<u64>,
    #[serde(default)]
    pub financial: Option<u64>,
    #[serde(default)]
    pub summary: Option<u64>,
}

/// Server → client: `GET /metrics/summary`. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub total_queries: Option<u64>,
    #[serde(default)]
    pub avg_response_time: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub agent_usage: Option<AgentUsage>,
    #[serde(default)]
    pub agent_percentages: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub fastest_query: Option<f64>,
    #[serde(default)]
    pub slowest_query: Option<f64>,
    #[serde(default)]
    pub total_documents: Option<u64>,
    #[serde(default)]
    pub total_chunks: Option<u64>,
    #[serde(default)]
    pub cost_per_query: Option<f64>,
    #[serde(default)]
    pub total_input_tokens: Option<u64>,
    #[serde(default)]
    pub total_output_tokens: Option<u64>,
}

/// Server → client: `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// FastAPI error body: `{"detail": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Detail as text; validation errors arrive as a list and are kept as JSON.
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
