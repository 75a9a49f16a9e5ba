//! Chat panel: session-local transcript, draft and in-flight tracking.
//!
//! Submitting appends the user message right away and never rolls it back. A
//! failed send flags the message so it can be retried; the answer, if any,
//! always lands at the end of the transcript.

use finrag_client::{ApiClient, ApiError, ChatResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to the Financial RAG System! Upload documents and ask me anything about your financial data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Backend reasoning component that produced an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Agent {
    Research,
    Financial,
    Summary,
    /// Client-generated messages such as the welcome text.
    System,
    Other(String),
}

impl Agent {
    pub fn from_label(label: &str) -> Self {
        match label {
            "research" => Agent::Research,
            "financial" => Agent::Financial,
            "summary" => Agent::Summary,
            "system" => Agent::System,
            other => Agent::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Agent::Research => "research",
            Agent::Financial => "financial",
            Agent::Summary => "summary",
            Agent::System => "system",
            Agent::Other(label) => label,
        }
    }

    /// Tag colour, or `None` for agents that are never tagged.
    pub fn tag(&self) -> Option<TagColor> {
        match self {
            Agent::Research => Some(TagColor::Blue),
            Agent::Financial => Some(TagColor::Green),
            Agent::Summary => Some(TagColor::Purple),
            Agent::System => None,
            Agent::Other(_) => Some(TagColor::Gray),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagColor {
    Blue,
    Green,
    Purple,
    Gray,
}

impl TagColor {
    pub fn class_name(self) -> &'static str {
        match self {
            TagColor::Blue => "tag-blue",
            TagColor::Green => "tag-green",
            TagColor::Purple => "tag-purple",
            TagColor::Gray => "tag-gray",
        }
    }

    /// SGR foreground code for terminals.
    pub fn ansi_code(self) -> u8 {
        match self {
            TagColor::Blue => 34,
            TagColor::Green => 32,
            TagColor::Purple => 35,
            TagColor::Gray => 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub agent: Option<Agent>,
    /// Set on a user message whose send failed.
    pub failed: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent: None,
            failed: false,
        }
    }

    pub fn assistant(content: impl Into<String>, agent: Agent) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent: Some(agent),
            failed: false,
        }
    }

    /// Tag shown under the message, if any.
    pub fn tag(&self) -> Option<(&str, TagColor)> {
        let agent = self.agent.as_ref()?;
        agent.tag().map(|color| (agent.label(), color))
    }
}

/// A user message accepted for sending, waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Position of the user message in the transcript.
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank draft; nothing appended, nothing sent.
    Ignored,
    Answered(Message),
    Failed(String),
}

pub struct ChatPanel {
    client: ApiClient,
    session_id: String,
    transcript: Vec<Message>,
    draft: String,
    in_flight: usize,
    last_error: Option<String>,
}

impl ChatPanel {
    pub fn new(client: ApiClient, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
            transcript: vec![Message::assistant(WELCOME_MESSAGE, Agent::System)],
            draft: String::new(),
            in_flight: 0,
            last_error: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Accept the draft: append it as a user message and clear the draft.
    ///
    /// Returns `None` for an empty or whitespace-only draft.
    pub fn begin_submit(&mut self) -> Option<OutgoingMessage> {
        if self.draft.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.draft);
        self.transcript.push(Message::user(text.clone()));
        self.in_flight += 1;
        Some(OutgoingMessage {
            index: self.transcript.len() - 1,
            text,
        })
    }

    /// Re-send the most recent failed user message, if there is one.
    pub fn begin_retry(&mut self) -> Option<OutgoingMessage> {
        let index = self
            .transcript
            .iter()
            .rposition(|m| m.role == Role::User && m.failed)?;
        let message = &mut self.transcript[index];
        message.failed = false;
        self.in_flight += 1;
        self.last_error = None;
        Some(OutgoingMessage {
            index,
            text: message.content.clone(),
        })
    }

    /// Record the backend's answer (or failure) for `outgoing`.
    pub fn complete(
        &mut self,
        outgoing: OutgoingMessage,
        result: Result<ChatResponse, ApiError>,
    ) -> SubmitOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(reply) => {
                let agent = Agent::from_label(&reply.agent_label());
                let message = Message::assistant(reply.response, agent);
                self.transcript.push(message.clone());
                self.last_error = None;
                SubmitOutcome::Answered(message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat message was not delivered");
                if let Some(message) = self.transcript.get_mut(outgoing.index) {
                    message.failed = true;
                }
                let error = e.to_string();
                self.last_error = Some(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Send `outgoing` with this panel's client and session.
    pub async fn deliver(&mut self, outgoing: OutgoingMessage) -> SubmitOutcome {
        let result = self
            .client
            .send_message(&outgoing.text, &self.session_id)
            .await;
        self.complete(outgoing, result)
    }

    /// Submit the draft and wait for the reply.
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            Some(outgoing) => self.deliver(outgoing).await,
            None => SubmitOutcome::Ignored,
        }
    }
}
