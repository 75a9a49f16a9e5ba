//! Tab shell composing the chat, documents and metrics panels.
//!
//! Network work started from the shell runs on spawned tasks and reports back
//! through a [`ShellEvent`] channel, so input keeps flowing while requests are
//! pending. The metrics poller lives exactly as long as the metrics tab is shown.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use finrag_client::{
    ApiClient, ApiError, ChatResponse, Config, QueryCache, ResourceKey, UploadedDocument,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::chat::{ChatPanel, OutgoingMessage};
use crate::commands::{CommandError, ConsoleCommand, HELP};
use crate::documents::DocumentPanel;
use crate::metrics::{MetricsPanel, MetricsPoller};
use crate::render::{self, RenderStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Documents,
    Metrics,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Chat, Tab::Documents, Tab::Metrics];

    pub fn name(self) -> &'static str {
        match self {
            Tab::Chat => "chat",
            Tab::Documents => "documents",
            Tab::Metrics => "metrics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Documents => "Documents",
            Tab::Metrics => "Metrics",
        }
    }
}

impl FromStr for Tab {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CommandError::UnknownTab(s.to_string()))
    }
}

/// Completion of work spawned by [`Shell::handle`].
#[derive(Debug)]
pub enum ShellEvent {
    ChatReply(OutgoingMessage, Result<ChatResponse, ApiError>),
    Uploaded(Vec<Result<UploadedDocument, ApiError>>),
    Deleted(i64, Result<serde_json::Value, ApiError>),
}

/// What the caller should do after handling a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Redraw the active panel.
    Render,
    /// Print this text, then continue.
    Print(String),
    Quit,
}

pub struct Shell {
    active: Tab,
    cache: Arc<QueryCache>,
    chat: ChatPanel,
    documents: DocumentPanel,
    metrics: MetricsPanel,
    poller: Option<MetricsPoller>,
    events: UnboundedSender<ShellEvent>,
}

impl Shell {
    /// Build the shell. Spawned work reports back on `events`.
    pub fn new(cfg: &Config, base_url: &str, events: UnboundedSender<ShellEvent>) -> Self {
        let client = ApiClient::new(base_url);
        let cache = Arc::new(QueryCache::new());
        Self {
            active: Tab::Chat,
            chat: ChatPanel::new(client.clone(), cfg.session_id()),
            documents: DocumentPanel::new(client.clone(), cache.clone()),
            metrics: MetricsPanel::new(client, cache.clone(), cfg.refresh_interval()),
            cache,
            poller: None,
            events,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    pub fn documents(&self) -> &DocumentPanel {
        &self.documents
    }

    pub fn metrics(&self) -> &MetricsPanel {
        &self.metrics
    }

    /// Any chat send, upload or delete still waiting for the backend.
    pub fn has_pending_work(&self) -> bool {
        self.chat.is_pending() || self.documents.is_uploading() || self.documents.is_deleting()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Show `tab`. Entering documents loads the list; entering metrics starts
    /// polling, and leaving metrics stops it.
    pub async fn switch_to(&mut self, tab: Tab) {
        if tab != Tab::Metrics {
            if let Some(poller) = self.poller.take() {
                poller.stop();
            }
        }
        self.active = tab;
        match tab {
            Tab::Documents => self.documents.reload().await,
            Tab::Metrics if self.poller.is_none() => {
                self.poller = Some(self.metrics.start_polling());
            }
            _ => {}
        }
    }

    /// Resolves after the next metrics poll; never resolves when not polling.
    pub async fn metrics_updated(&mut self) {
        match self.poller.as_mut() {
            Some(poller) => poller.changed().await,
            None => std::future::pending().await,
        }
    }

    pub fn render(&self, style: RenderStyle) -> String {
        let body = match self.active {
            Tab::Chat => render::chat(&self.chat, style),
            Tab::Documents => render::documents(&self.documents, style),
            Tab::Metrics => render::metrics(&self.metrics.view(), style),
        };
        format!("{}\n{}", render::tab_bar(self.active, style), body)
    }

    /// Parse and act on one input line.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<ConsoleCommand>() {
            Ok(cmd) => self.handle(cmd).await,
            Err(e) => Flow::Print(e.to_string()),
        }
    }

    pub async fn handle(&mut self, cmd: ConsoleCommand) -> Flow {
        match cmd {
            ConsoleCommand::Quit => Flow::Quit,
            ConsoleCommand::Help => Flow::Print(HELP.to_string()),
            ConsoleCommand::Tab(tab) => {
                self.switch_to(tab).await;
                Flow::Render
            }
            ConsoleCommand::Say(text) => {
                self.chat.set_draft(text);
                if let Some(outgoing) = self.chat.begin_submit() {
                    if self.active != Tab::Chat {
                        self.switch_to(Tab::Chat).await;
                    }
                    self.spawn_chat(outgoing);
                }
                Flow::Render
            }
            ConsoleCommand::Retry => match self.chat.begin_retry() {
                Some(outgoing) => {
                    self.spawn_chat(outgoing);
                    Flow::Render
                }
                None => Flow::Print("Nothing to retry.".to_string()),
            },
            ConsoleCommand::Upload(paths) => {
                self.spawn_upload(paths);
                Flow::Render
            }
            ConsoleCommand::Delete(id) => {
                self.spawn_delete(id);
                Flow::Render
            }
            ConsoleCommand::Refresh => {
                match self.active {
                    Tab::Chat => {}
                    Tab::Documents => {
                        self.cache.invalidate(ResourceKey::Documents);
                        self.documents.reload().await;
                    }
                    Tab::Metrics => {
                        if let Err(e) = self.metrics.refresh().await {
                            tracing::warn!(error = %e, "metrics refresh failed");
                        }
                    }
                }
                Flow::Render
            }
        }
    }

    /// Fold a finished background request into panel state.
    pub async fn apply(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::ChatReply(outgoing, result) => {
                self.chat.complete(outgoing, result);
            }
            ShellEvent::Uploaded(results) => {
                self.documents.finish_upload(&results);
                self.documents.reload().await;
            }
            ShellEvent::Deleted(id, result) => {
                self.documents.finish_delete(id, &result);
                self.documents.reload().await;
            }
        }
    }

    fn spawn_chat(&self, outgoing: OutgoingMessage) {
        let client = self.chat.client().clone();
        let session_id = self.chat.session_id().to_string();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.send_message(&outgoing.text, &session_id).await;
            // The receiver only goes away on shutdown.
            let _ = events.send(ShellEvent::ChatReply(outgoing, result));
        });
    }

    fn spawn_upload(&mut self, paths: Vec<PathBuf>) {
        self.documents.begin_upload(paths.len());
        let client = self.documents.client().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let results = client.upload_paths(&paths).await;
            let _ = events.send(ShellEvent::Uploaded(results));
        });
    }

    fn spawn_delete(&mut self, id: i64) {
        self.documents.begin_delete();
        let client = self.documents.client().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.delete_document(id).await;
            let _ = events.send(ShellEvent::Deleted(id, result));
        });
    }
}
