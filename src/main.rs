//! EventManager CLI entry point.
//!
//! `chat` runs the interactive console; the other subcommands read or clear
//! stored data and exit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;
use tracing::{info, warn};

use eventmanager::activity::{ActivityLog, ActivityLogger, LogLevel};
use eventmanager::chat::{ChatController, Collaborators};
use eventmanager::config::{load_config, runtime_paths, Config, RuntimePaths};
use eventmanager::console::{self, render_history, render_reply, ConsoleOptions};
use eventmanager::credentials::{load_default_credentials, Credentials};
use eventmanager::events::store::{EventStore, KvEventStore};
use eventmanager::export::Exporter;
use eventmanager::history::{ChatHistory, ConversationLog};
use eventmanager::intent::KeywordClassifier;
use eventmanager::providers::huggingface::{HfParameters, HuggingFaceProvider, InferenceTask};
use eventmanager::providers::router::FallbackChain;
use eventmanager::providers::TextGenerator;
use eventmanager::responder::{OfflineResponder, RemoteResponder, ResponseGenerator};
use eventmanager::storage::sqlite::SqliteStore;
use eventmanager::storage::KeyValueStore;

/// EventManager: plan events by answering six questions.
#[derive(Parser)]
#[command(name = "eventmanager", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Start an interactive conversation.
    Chat {
        /// Use template replies only; never call the remote model.
        #[arg(long)]
        offline: bool,
    },
    /// List stored events, newest first.
    Events {
        /// Maximum number of events to show.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Export all events as a spreadsheet plus the event log.
    Export,
    /// Export the system log.
    Logs {
        /// Include detailed event logs.
        #[arg(long)]
        all: bool,
    },
    /// Show recent conversation days.
    History {
        /// Number of days to show.
        #[arg(long)]
        days: Option<usize>,
    },
    /// Delete stored data.
    Clear {
        /// What to delete.
        #[arg(value_enum)]
        target: ClearTarget,
    },
}

/// Data sets removable with `clear`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ClearTarget {
    /// Conversation history.
    History,
    /// Stored events.
    Events,
    /// System and event logs.
    Logs,
    /// Everything above.
    All,
}

/// Everything a subcommand needs.
struct App {
    config: Config,
    paths: RuntimePaths,
    kv: Arc<SqliteStore>,
    store: Arc<dyn EventStore>,
    history: Arc<dyn ConversationLog>,
    activity: Arc<dyn ActivityLog>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Chat { offline } => handle_chat(offline).await,
        Command::Events { limit } => handle_events(limit).await,
        Command::Export => handle_export().await,
        Command::Logs { all } => handle_logs(all).await,
        Command::History { days } => handle_history(days).await,
        Command::Clear { target } => handle_clear(target).await,
    }
}

/// Resolve paths, load config and open storage.
async fn open_app() -> anyhow::Result<App> {
    let base = runtime_paths()?;
    std::fs::create_dir_all(&base.root)
        .with_context(|| format!("failed to create {}", base.root.display()))?;

    let mut config = load_config(&base.config_toml)
        .with_context(|| format!("failed to load {}", base.config_toml.display()))?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    let paths = base.with_storage_overrides(&config.storage);
    let kv = Arc::new(SqliteStore::open(&paths.database).await?);
    let shared: Arc<dyn KeyValueStore> = kv.clone();

    let store: Arc<dyn EventStore> = Arc::new(KvEventStore::new(Arc::clone(&shared)));
    let history: Arc<dyn ConversationLog> = Arc::new(ChatHistory::new(Arc::clone(&shared)));
    let activity: Arc<dyn ActivityLog> = Arc::new(ActivityLogger::new(
        shared,
        config.logs.max_entries,
        config.logs.max_event_entries,
    ));

    Ok(App {
        config,
        paths,
        kv,
        store,
        history,
        activity,
    })
}

impl App {
    fn controller(&self, responder: Arc<dyn ResponseGenerator>) -> ChatController {
        ChatController::new(
            Collaborators {
                classifier: Arc::new(KeywordClassifier),
                store: Arc::clone(&self.store),
                history: Arc::clone(&self.history),
                activity: Arc::clone(&self.activity),
                responder,
            },
            self.config.chat.recent_events_limit,
        )
    }

    fn exporter(&self) -> Exporter {
        Exporter::new(self.paths.exports_dir.clone())
    }
}

/// Build the remote responder: conversational chain for free talk,
/// text-to-text endpoint for summaries.
fn build_responder(
    config: &Config,
    credentials: &Credentials,
) -> anyhow::Result<Arc<dyn ResponseGenerator>> {
    let llm = &config.llm;
    let timeout = Duration::from_secs(llm.timeout_secs);
    let parameters = HfParameters {
        max_length: llm.max_length,
        temperature: llm.temperature,
        repetition_penalty: llm.repetition_penalty,
    };
    let token = credentials.get(&llm.token_env).map(str::to_owned);

    let primary: Arc<dyn TextGenerator> = Arc::new(
        HuggingFaceProvider::new(&llm.chat_url, InferenceTask::Conversational, timeout)
            .context("failed to build chat provider")?
            .with_parameters(parameters)
            .with_token(token.clone()),
    );
    let fallback = match &llm.fallback_url {
        Some(url) => Some(Arc::new(
            HuggingFaceProvider::new(url, InferenceTask::Conversational, timeout)
                .context("failed to build fallback chat provider")?
                .with_parameters(parameters)
                .with_token(token.clone()),
        ) as Arc<dyn TextGenerator>),
        None => None,
    };
    let summary: Arc<dyn TextGenerator> = Arc::new(
        HuggingFaceProvider::new(&llm.summary_url, InferenceTask::Text2Text, timeout)
            .context("failed to build summary provider")?
            .with_token(token),
    );

    let chat = FallbackChain::new(primary, fallback);
    info!(
        chat = %llm.chat_url,
        summary = %llm.summary_url,
        fallback = chat.has_fallback(),
        "remote responder configured"
    );
    Ok(Arc::new(RemoteResponder::new(Arc::new(chat), summary, timeout)))
}

async fn handle_chat(offline: bool) -> anyhow::Result<()> {
    let app = open_app().await?;
    let _logging_guard = eventmanager::logging::init_production(&app.paths.logs_dir)?;

    let responder: Arc<dyn ResponseGenerator> = if offline {
        info!("offline mode, template replies only");
        Arc::new(OfflineResponder)
    } else {
        let credentials = load_default_credentials(&app.config.llm.token_env)
            .with_context(|| format!("failed to load {}", app.paths.env_file.display()))?;
        build_responder(&app.config, &credentials)?
    };

    let mut controller = app.controller(responder);
    let options = ConsoleOptions {
        simulate_typing: app.config.chat.simulate_typing,
        history_days: app.config.chat.history_days,
    };
    let exporter = app.exporter();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let result = console::run(&mut controller, &exporter, &options, stdin, &mut stdout).await;

    app.kv.close().await;
    result
}

async fn handle_events(limit: Option<usize>) -> anyhow::Result<()> {
    eventmanager::logging::init_cli();
    let app = open_app().await?;
    let limit = limit.unwrap_or(app.config.chat.recent_events_limit);

    let events = app.store.list(limit).await.context("failed to list events")?;
    if events.is_empty() {
        println!("{}", eventmanager::chat::replies::NO_EVENTS);
    } else {
        println!("{}", eventmanager::chat::replies::format_event_list(&events));
    }
    app.kv.close().await;
    Ok(())
}

async fn handle_export() -> anyhow::Result<()> {
    eventmanager::logging::init_cli();
    let app = open_app().await?;
    let exporter = app.exporter();
    let mut controller = app.controller(Arc::new(OfflineResponder));

    let reply = controller.export_events(&exporter).await;
    println!("{}", render_reply(&reply));
    app.kv.close().await;
    Ok(())
}

async fn handle_logs(all: bool) -> anyhow::Result<()> {
    eventmanager::logging::init_cli();
    let app = open_app().await?;
    let exporter = app.exporter();
    let mut controller = app.controller(Arc::new(OfflineResponder));

    let reply = controller.export_logs(&exporter, all).await;
    println!("{}", render_reply(&reply));
    app.kv.close().await;
    Ok(())
}

async fn handle_history(days: Option<usize>) -> anyhow::Result<()> {
    eventmanager::logging::init_cli();
    let app = open_app().await?;
    let days = days.unwrap_or(app.config.chat.history_days);

    let groups = app.history.recent(days).await.context("failed to read history")?;
    println!("{}", render_history(&groups));
    app.kv.close().await;
    Ok(())
}

async fn handle_clear(target: ClearTarget) -> anyhow::Result<()> {
    eventmanager::logging::init_cli();
    let app = open_app().await?;

    if matches!(target, ClearTarget::History | ClearTarget::All) {
        app.history.clear().await.context("failed to clear history")?;
        println!("Chat history cleared.");
    }
    if matches!(target, ClearTarget::Events | ClearTarget::All) {
        app.store.clear().await.context("failed to clear events")?;
        println!("Events cleared.");
    }
    if matches!(target, ClearTarget::Logs | ClearTarget::All) {
        app.activity.clear().await.context("failed to clear logs")?;
        println!("Logs cleared.");
    }
    if matches!(target, ClearTarget::History | ClearTarget::Events) {
        let message = format!("Cleared {target:?} from the command line");
        if let Err(e) = app.activity.log(LogLevel::Info, &message).await {
            warn!(error = %e, "failed to record clear");
        }
    }

    app.kv.close().await;
    Ok(())
}
