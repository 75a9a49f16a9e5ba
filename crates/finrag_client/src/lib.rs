//! Shared Financial RAG client library (config, HTTP API, query cache,
//! metrics formatting).
//! Used by the `finrag` CLI and the interactive console.

pub mod cache;
pub mod client;
pub mod config;
pub mod messages;
pub mod metrics;

pub use cache::{QueryCache, QuerySnapshot, Resource, ResourceKey};
pub use client::{ApiClient, ApiError, UploadFile};
pub use config::{default_config_path, Config, ConfigError};
pub use messages::{
    agent_label_from_sources, AgentUsage, ChatResponse, Document, HealthStatus,
    MetricsSnapshot, UploadedDocument,
};
pub use metrics::{estimated_monthly_cost, MetricsDisplay};
