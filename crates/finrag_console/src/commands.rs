//! Console input parsing. Lines starting with `/` are commands; anything else
//! is chat text.

use std::path::PathBuf;
use std::str::FromStr;

use crate::shell::Tab;

pub const HELP: &str = "\
Commands:
  /tab chat|documents|metrics   switch panel
  /upload FILE...               upload documents (one request per file)
  /delete ID                    delete a document
  /refresh                      reload the current panel
  /retry                        resend the last undelivered chat message
  /help                         show this help
  /quit                         exit
Any other line is sent as a chat message.";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Tab(Tab),
    Upload(Vec<PathBuf>),
    Delete(i64),
    Refresh,
    Retry,
    Help,
    Quit,
    Say(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: /{0} (try /help)")]
    Unknown(String),
    #[error("unknown tab: {0} (chat, documents or metrics)")]
    UnknownTab(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid document id: {0}")]
    InvalidId(String),
}

impl FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Ok(ConsoleCommand::Say(line.to_string()));
        };
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match name {
            "tab" => match args.as_slice() {
                [tab] => tab.parse().map(ConsoleCommand::Tab),
                _ => Err(CommandError::Usage("/tab chat|documents|metrics")),
            },
            "chat" | "documents" | "metrics" if args.is_empty() => {
                name.parse().map(ConsoleCommand::Tab)
            }
            "upload" if args.is_empty() => Err(CommandError::Usage("/upload FILE...")),
            "upload" => Ok(ConsoleCommand::Upload(
                args.into_iter().map(PathBuf::from).collect(),
            )),
            "delete" => match args.as_slice() {
                [id] => id
                    .parse()
                    .map(ConsoleCommand::Delete)
                    .map_err(|_| CommandError::InvalidId(id.to_string())),
                _ => Err(CommandError::Usage("/delete ID")),
            },
            "refresh" => Ok(ConsoleCommand::Refresh),
            "retry" => Ok(ConsoleCommand::Retry),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
