//! finrag: one-shot command-line client for the Financial RAG backend.
//!
//! ```bash
//! finrag ask "What was Q3 revenue?"
//! echo "Summarize the filing" | finrag ask
//! finrag upload report.pdf notes.txt
//! finrag list --json
//! finrag delete 3
//! finrag metrics --json
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use finrag_client::{config, ApiClient, MetricsDisplay};
use tracing_subscriber::EnvFilter;

/// Financial RAG command-line client.
#[derive(Parser)]
#[command(name = "finrag", version, about)]
struct Cli {
    /// Config file (default: $FINRAG_CONFIG, then ~/.finrag/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin, overrides api.base_url from the config
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a question; reads the first stdin line when QUESTION is omitted
    Ask { question: Option<String> },
    /// Upload one or more documents (each file is a separate request)
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List uploaded documents
    List,
    /// Delete a document by id
    Delete { id: i64 },
    /// Show the metrics summary
    Metrics,
    /// Check backend health
    Health,
}

fn read_question(arg: Option<String>) -> Result<String> {
    let question = match arg {
        Some(q) => q,
        None => {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read question from stdin")?;
            line
        }
    };
    let question = question.trim().to_string();
    if question.is_empty() {
        bail!("no question provided (pass it as an argument or on stdin)");
    }
    Ok(question)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_metrics(d: &MetricsDisplay) {
    let rows = [
        ("Total Queries", &d.total_queries),
        ("Avg Response Time", &d.avg_response_time),
        ("Total Cost", &d.total_cost),
        ("Success Rate", &d.success_rate),
        ("Research", &d.research_queries),
        ("Financial", &d.financial_queries),
        ("Summary", &d.summary_queries),
        ("Fastest Query", &d.fastest_query),
        ("Slowest Query", &d.slowest_query),
        ("Documents", &d.total_documents),
        ("Total Chunks", &d.total_chunks),
        ("Cost per Query", &d.cost_per_query),
        ("Est. Monthly", &d.estimated_monthly_cost),
        ("Input Tokens", &d.input_tokens),
        ("Output Tokens", &d.output_tokens),
    ];
    for (name, value) in rows {
        println!("{:<20}{}", name, value);
    }
    for (agent, pct) in &d.agent_percentages {
        println!("  {:<18}{}", agent, pct);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cfg = config::resolve(cli.config.as_deref()).context("failed to load config")?;
    let base_url = cli.base_url.as_deref().unwrap_or_else(|| cfg.base_url());
    let client = ApiClient::new(base_url);

    match cli.command {
        Command::Ask { question } => {
            let question = read_question(question)?;
            let reply = client
                .send_message(&question, cfg.session_id())
                .await
                .context("chat request failed")?;
            if cli.json {
                print_json(&reply)?;
            } else {
                println!("{}", reply.response);
                println!("\nAgent: {}", reply.agent_label());
            }
        }
        Command::Upload { files } => {
            let mut failed = 0usize;
            let results = client.upload_paths(&files).await;
            for (path, result) in files.iter().zip(results) {
                match result {
                    Ok(doc) if cli.json => print_json(&doc)?,
                    Ok(doc) => println!(
                        "{}: uploaded as #{} ({} chunks){}",
                        path.display(),
                        doc.id,
                        doc.num_chunks,
                        doc.message.map(|m| format!(" - {}", m)).unwrap_or_default()
                    ),
                    Err(e) => {
                        failed += 1;
                        eprintln!("Error: {}: {}", path.display(), e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} uploads failed", failed, files.len());
            }
        }
        Command::List => {
            let docs = client
                .list_documents()
                .await
                .context("listing documents failed")?;
            if cli.json {
                print_json(&docs)?;
            } else if docs.is_empty() {
                println!("No documents uploaded yet");
            } else {
                for doc in &docs {
                    println!(
                        "{:>4}  {}  ({} chunks • {})",
                        doc.id,
                        doc.filename,
                        doc.num_chunks,
                        doc.file_type.to_uppercase()
                    );
                }
            }
        }
        Command::Delete { id } => {
            let payload = client
                .delete_document(id)
                .await
                .with_context(|| format!("deleting document {} failed", id))?;
            match payload.get("message").and_then(|m| m.as_str()) {
                Some(message) if !cli.json => println!("{}", message),
                _ => print_json(&payload)?,
            }
        }
        Command::Metrics => {
            let snapshot = client
                .fetch_metrics_summary()
                .await
                .context("fetching metrics failed")?;
            let display = MetricsDisplay::from(&snapshot);
            if cli.json {
                print_json(&display)?;
            } else {
                print_metrics(&display);
            }
        }
        Command::Health => {
            let health = client.health().await.context("health check failed")?;
            if cli.json {
                print_json(&health)?;
            } else {
                println!("{}", health.status);
            }
        }
    }

    Ok(())
}
