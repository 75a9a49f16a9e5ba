//! Plain-text rendering of the panels. Colour is optional ANSI on agent tags
//! and banners; everything else is unstyled text.

use std::fmt::Write as _;

use crate::chat::{ChatPanel, Role, TagColor};
use crate::documents::{DocumentListView, DocumentPanel};
use crate::metrics::MetricsView;
use crate::shell::Tab;

pub const EMPTY_DOCUMENTS: &str = "No documents uploaded yet";
pub const UPLOAD_SUCCESS: &str = "Document uploaded successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStyle {
    pub color: bool,
}

impl RenderStyle {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    fn paint(self, text: &str, code: u8) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn error(self, text: &str) -> String {
        self.paint(text, 31)
    }
}

pub fn tab_bar(active: Tab, style: RenderStyle) -> String {
    Tab::ALL
        .iter()
        .map(|&tab| {
            if tab == active {
                style.paint(&format!("[{}]", tab.title()), 1)
            } else {
                format!(" {} ", tab.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn tag(label: &str, color: TagColor, style: RenderStyle) -> String {
    style.paint(&format!("({} agent)", label), color.ansi_code())
}

pub fn chat(panel: &ChatPanel, style: RenderStyle) -> String {
    let mut out = String::from("Multi-Agent Financial Assistant\n");
    for message in panel.transcript() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "bot",
        };
        let _ = writeln!(out, "[{}] {}", who, message.content);
        if message.failed {
            let _ = writeln!(out, "      {}", style.error("not delivered (/retry to resend)"));
        }
        if let Some((label, color)) = message.tag() {
            let _ = writeln!(out, "      {}", tag(label, color, style));
        }
    }
    if panel.is_pending() {
        let _ = writeln!(out, "[bot] ...");
    }
    if let Some(error) = panel.last_error() {
        let _ = writeln!(out, "{}", style.error(&format!("Error: {}", error)));
    }
    out
}

pub fn documents(panel: &DocumentPanel, style: RenderStyle) -> String {
    let mut out = String::from("Document Upload (PDF and TXT)\n");
    if panel.is_uploading() {
        let _ = writeln!(out, "Uploading document...");
    }
    if panel.upload_succeeded() {
        let banner = match panel.upload_message() {
            Some(message) => format!("{} {}", UPLOAD_SUCCESS, message),
            None => UPLOAD_SUCCESS.to_string(),
        };
        let _ = writeln!(out, "{}", style.paint(&banner, 32));
    }
    if panel.is_deleting() {
        let _ = writeln!(out, "Deleting...");
    }
    if let Some(error) = panel.last_error() {
        let _ = writeln!(out, "{}", style.error(&format!("Error: {}", error)));
    }

    let _ = writeln!(out, "\nUploaded Documents");
    let refresh_error = match panel.list_view() {
        DocumentListView::Loading => {
            let _ = writeln!(out, "Loading documents...");
            None
        }
        DocumentListView::Empty { refresh_error } => {
            let _ = writeln!(out, "{}", EMPTY_DOCUMENTS);
            refresh_error
        }
        DocumentListView::Error(error) => {
            let _ = writeln!(
                out,
                "{}",
                style.error(&format!("Failed to load documents: {}", error))
            );
            None
        }
        DocumentListView::Documents {
            docs,
            refresh_error,
        } => {
            for doc in docs.iter() {
                let _ = writeln!(out, "#{:<4} {}", doc.id, doc.filename);
                let _ = writeln!(
                    out,
                    "      {} chunks • {}",
                    doc.num_chunks,
                    doc.file_type.to_uppercase()
                );
            }
            refresh_error
        }
    };
    if let Some(error) = refresh_error {
        let _ = writeln!(out, "\n{}", style.error(&format!("Last refresh failed: {}", error)));
    }
    out
}

pub fn metrics(view: &MetricsView, style: RenderStyle) -> String {
    let mut out = String::from("System Metrics\n");
    let (d, refresh_error) = match view {
        MetricsView::Loading => {
            out.push_str("Loading metrics...\n");
            return out;
        }
        MetricsView::Error(error) => {
            let _ = writeln!(out, "{}", style.error(&format!("Failed to load metrics: {}", error)));
            return out;
        }
        MetricsView::Ready {
            display,
            refresh_error,
        } => (display, refresh_error),
    };

    let rows = [
        ("Total Queries", &d.total_queries),
        ("Avg Response Time", &d.avg_response_time),
        ("Total Cost", &d.total_cost),
        ("Success Rate", &d.success_rate),
    ];
    for (name, value) in rows {
        let _ = writeln!(out, "{:<20}{}", name, value);
    }

    let _ = writeln!(out, "\nAgents (queries handled)");
    let agents = [
        ("Research", &d.research_queries, TagColor::Blue),
        ("Financial", &d.financial_queries, TagColor::Green),
        ("Summary", &d.summary_queries, TagColor::Purple),
    ];
    for (name, value, color) in agents {
        let _ = writeln!(out, "{:<20}{}", name, style.paint(value, color.ansi_code()));
    }
    for (agent, pct) in &d.agent_percentages {
        let _ = writeln!(out, "  {:<18}{}", agent, pct);
    }

    let _ = writeln!(out, "\nPerformance");
    let perf = [
        ("Fastest Query", &d.fastest_query),
        ("Slowest Query", &d.slowest_query),
        ("Documents", &d.total_documents),
        ("Total Chunks", &d.total_chunks),
    ];
    for (name, value) in perf {
        let _ = writeln!(out, "{:<20}{}", name, value);
    }

    let _ = writeln!(out, "\nCost Analysis");
    let cost = [
        ("Cost per Query", &d.cost_per_query),
        ("Est. Monthly", &d.estimated_monthly_cost),
        ("Input Tokens", &d.input_tokens),
        ("Output Tokens", &d.output_tokens),
    ];
    for (name, value) in cost {
        let _ = writeln!(out, "{:<20}{}", name, value);
    }

    if let Some(error) = refresh_error {
        let _ = writeln!(out, "\n{}", style.error(&format!("Last refresh failed: {}", error)));
    }
    out
}
