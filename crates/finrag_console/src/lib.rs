//! Interactive console for the Financial RAG backend: chat, document and
//! metrics panels behind a tab shell. Panels are plain state holders so they
//! can be driven from tests without a terminal.

pub mod chat;
pub mod commands;
pub mod documents;
pub mod metrics;
pub mod render;
pub mod shell;

pub use chat::{Agent, ChatPanel, Message, Role, SubmitOutcome, TagColor};
pub use documents::{DocumentListView, DocumentPanel};
pub use metrics::{MetricsDisplay, MetricsPanel, MetricsPoller, MetricsView};
pub use render::RenderStyle;
pub use shell::{Flow, Shell, ShellEvent, Tab};
