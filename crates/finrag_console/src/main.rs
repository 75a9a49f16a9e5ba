//! finrag-console: interactive terminal front-end.
//! Reads commands and chat lines from stdin and redraws the active panel on
//! stdout. Logs go to stderr.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use finrag_client::config;
use finrag_console::commands::HELP;
use finrag_console::{Flow, RenderStyle, Shell, Tab};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Financial RAG interactive console.
#[derive(Parser)]
#[command(name = "finrag-console", version, about)]
struct Cli {
    /// Config file (default: $FINRAG_CONFIG, then ~/.finrag/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend origin, overrides api.base_url from the config
    #[arg(long)]
    base_url: Option<String>,

    /// Panel to open first
    #[arg(long, default_value = "chat")]
    tab: String,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn draw(shell: &Shell, style: RenderStyle) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{}", shell.render(style));
    let _ = out.flush();
}

#[tokio::main]
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
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::resolve(cli.config.as_deref()).context("failed to load config")?;
    let base_url = cli.base_url.clone().unwrap_or_else(|| cfg.base_url().to_string());
    let first_tab: Tab = cli.tab.parse()?;
    let style = if cli.no_color || !std::io::stdout().is_terminal() {
        RenderStyle::plain()
    } else {
        RenderStyle::colored()
    };

    let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
    let mut shell = Shell::new(&cfg, &base_url, tx);
    tracing::info!(%base_url, "console started");

    println!("{}\n", HELP);
    shell.switch_to(first_tab).await;
    draw(&shell, style);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    // Input closed: let in-flight requests land before exiting.
                    while shell.has_pending_work() {
                        let Some(event) = events.recv().await else { break };
                        shell.apply(event).await;
                        draw(&shell, style);
                    }
                    break;
                };
                match shell.handle_line(&line).await {
                    Flow::Quit => break,
                    Flow::Print(text) => println!("{}", text),
                    Flow::Render => draw(&shell, style),
                }
            }
            Some(event) = events.recv() => {
                shell.apply(event).await;
                draw(&shell, style);
            }
            _ = shell.metrics_updated() => {
                draw(&shell, style);
            }
        }
    }

    Ok(())
}
