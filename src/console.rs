//! Interactive terminal front end for [`ChatController`].
//!
//! Reads one line at a time, maps slash commands to toolbar actions and
//! renders each [`Reply`] after its typing pause.

use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::chat::{BotMessage, ChatController, Reply};
use crate::export::Exporter;
use crate::history::DayGroup;

const PREVIEW_CHARS: usize = 30;

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ordinary chat input.
    Message(String),
    /// `/export`: spreadsheet plus event log.
    Export,
    /// `/logs`: combined log file.
    Logs,
    /// `/clear`: drop conversation history.
    Clear,
    /// `/history`: list recent conversation days.
    History,
    /// `/help`: list slash commands.
    Help,
    /// `/quit` or `/exit`.
    Quit,
    /// A slash command we don't know.
    Unknown(String),
}

/// Parse a raw input line. Anything not starting with `/` is a message.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Message(trimmed.to_owned());
    };
    match rest.split_whitespace().next().unwrap_or_default() {
        "export" => Command::Export,
        "logs" => Command::Logs,
        "clear" => Command::Clear,
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_owned()),
    }
}

/// Slash command reference.
pub fn help_text() -> String {
    [
        "Commands:",
        "",
        "/export  - export events as a spreadsheet plus the event log",
        "/logs    - export system and event logs",
        "/clear   - clear chat history",
        "/history - show recent conversations",
        "/help    - show this message",
        "/quit    - leave",
    ]
    .join("\n")
}

/// Render a reply: messages first, examples indented, chips last.
pub fn render_reply(reply: &Reply) -> String {
    let mut lines = Vec::new();
    for message in &reply.messages {
        match message {
            BotMessage::Text(text) => lines.push(format!("bot> {text}")),
            BotMessage::Example(text) => lines.push(format!("     e.g. {text}")),
        }
    }
    if !reply.suggestions.is_empty() {
        let chips: Vec<String> = reply.suggestions.iter().map(|s| format!("[{s}]")).collect();
        lines.push(format!("     {}", chips.join(" ")));
    }
    lines.join("\n")
}

/// Render day groups as `date: preview` lines.
pub fn render_history(groups: &[DayGroup]) -> String {
    if groups.is_empty() {
        return "No conversation history yet.".to_owned();
    }
    groups
        .iter()
        .map(|g| {
            format!(
                "{} ({} messages): {}",
                g.date.format("%Y-%m-%d"),
                g.messages.len(),
                g.preview(PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Console session settings.
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Pause for each reply's typing delay before printing it.
    pub simulate_typing: bool,
    /// Days shown by `/history`.
    pub history_days: usize,
}

/// Run the read-eval-print loop until EOF or `/quit`.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<R, W>(
    controller: &mut ChatController,
    exporter: &Exporter,
    options: &ConsoleOptions,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(session = %controller.session_id(), "console session started");
    emit(out, &render_reply(&controller.welcome()))?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let reply = match parse_line(&line) {
            Command::Message(text) => match controller.handle_input(&text).await {
                Some(reply) => reply,
                None => continue,
            },
            Command::Export => controller.export_events(exporter).await,
            Command::Logs => controller.export_logs(exporter, true).await,
            Command::Clear => controller.clear_history().await,
            Command::History => {
                let groups = controller.history(options.history_days).await;
                emit(out, &render_history(&groups))?;
                continue;
            }
            Command::Help => {
                emit(out, &help_text())?;
                continue;
            }
            Command::Quit => break,
            Command::Unknown(name) => {
                debug!(command = %name, "unknown console command");
                emit(out, &format!("Unknown command /{name}. Type /help for a list."))?;
                continue;
            }
        };

        if options.simulate_typing && !reply.typing.is_zero() {
            tokio::time::sleep(reply.typing).await;
        }
        emit(out, &render_reply(&reply))?;
    }

    info!(session = %controller.session_id(), "console session ended");
    Ok(())
}

fn emit<W: Write>(out: &mut W, text: &str) -> anyhow::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    writeln!(out, "{text}").context("failed to write output")?;
    out.flush().context("failed to flush output")
}
