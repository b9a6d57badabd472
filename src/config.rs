//! Configuration loading and validation.
//!
//! EventManager keeps all runtime state under `~/.eventmanager/`:
//! - `config.toml`: optional, every section falls back to defaults
//! - `.env`: optional credentials (remote API token)
//! - `eventmanager.db`: key-value storage for events, history and logs
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote text-generation endpoints.
    pub llm: LlmConfig,

    /// Conversation behaviour.
    pub chat: ChatConfig,

    /// Retention caps for the activity log.
    pub logs: LogsConfig,

    /// Storage location overrides.
    pub storage: StorageConfig,
}

/// Remote text-generation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Primary conversational endpoint.
    pub chat_url: String,

    /// Conversational endpoint tried once when the primary fails.
    pub fallback_url: Option<String>,

    /// Endpoint used to write the completion summary.
    pub summary_url: String,

    /// Name of the credential holding the bearer token.
    pub token_env: String,

    /// Upper bound for a single remote call, in seconds.
    pub timeout_secs: u64,

    /// `max_length` generation parameter.
    pub max_length: u32,

    /// `temperature` generation parameter.
    pub temperature: f32,

    /// `repetition_penalty` generation parameter.
    pub repetition_penalty: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat_url: "https://api-inference.huggingface.co/models/microsoft/DialoGPT-large"
                .to_owned(),
            fallback_url: Some(
                "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium".to_owned(),
            ),
            summary_url: "https://api-inference.huggingface.co/models/google/flan-t5-base"
                .to_owned(),
            token_env: "HF_API_TOKEN".to_owned(),
            timeout_secs: default_timeout_secs(),
            max_length: 500,
            temperature: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

/// Conversation behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Pause before bot replies to mimic typing.
    pub simulate_typing: bool,

    /// Number of events listed by "show my events".
    pub recent_events_limit: usize,

    /// Number of day groups shown by the history view.
    pub history_days: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            simulate_typing: true,
            recent_events_limit: 10,
            history_days: 7,
        }
    }
}

/// Activity log retention caps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Maximum system log lines kept.
    pub max_entries: usize,

    /// Maximum detailed event log blocks kept.
    pub max_event_entries: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_event_entries: 50,
        }
    }
}

/// Storage overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; defaults to `<runtime>/eventmanager.db`.
    pub database: Option<PathBuf>,

    /// Export directory; defaults to `<runtime>/exports`.
    pub exports_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Parse a TOML string into config and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a URL is invalid.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("failed to parse config TOML: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function so tests never touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("EVENTMANAGER_CHAT_URL") {
            self.llm.chat_url = v;
        }
        if let Some(v) = env("EVENTMANAGER_FALLBACK_URL") {
            self.llm.fallback_url = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Some(v) = env("EVENTMANAGER_SUMMARY_URL") {
            self.llm.summary_url = v;
        }
        if let Some(v) = env("EVENTMANAGER_LLM_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.llm.timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "EVENTMANAGER_LLM_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("EVENTMANAGER_SIMULATE_TYPING") {
            match v.parse() {
                Ok(b) => self.chat.simulate_typing = b,
                Err(_) => tracing::warn!(
                    var = "EVENTMANAGER_SIMULATE_TYPING",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("EVENTMANAGER_DATABASE") {
            self.storage.database = Some(PathBuf::from(v));
        }
    }

    /// Check endpoint URLs and numeric limits.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_url("llm.chat_url", &self.llm.chat_url)?;
        validate_url("llm.summary_url", &self.llm.summary_url)?;
        if let Some(fallback) = &self.llm.fallback_url {
            validate_url("llm.fallback_url", fallback)?;
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than zero");
        }
        if self.logs.max_entries == 0 || self.logs.max_event_entries == 0 {
            anyhow::bail!("logs caps must be greater than zero");
        }
        Ok(())
    }
}

fn validate_url(field: &str, raw: &str) -> anyhow::Result<()> {
    let parsed =
        url::Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid URL for {field}: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow::anyhow!(
            "invalid URL for {field}: unsupported scheme '{other}'"
        )),
    }
}

/// Filesystem layout under the runtime directory.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Runtime root (`~/.eventmanager`).
    pub root: PathBuf,
    /// Human-owned configuration file.
    pub config_toml: PathBuf,
    /// Credentials file.
    pub env_file: PathBuf,
    /// SQLite key-value store.
    pub database: PathBuf,
    /// Rolling JSON tracing logs.
    pub logs_dir: PathBuf,
    /// Destination for spreadsheet and log exports.
    pub exports_dir: PathBuf,
}

impl RuntimePaths {
    /// Build the layout rooted at `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            config_toml: root.join("config.toml"),
            env_file: root.join(".env"),
            database: root.join("eventmanager.db"),
            logs_dir: root.join("logs"),
            exports_dir: root.join("exports"),
        }
    }

    /// Apply storage overrides from config.
    pub fn with_storage_overrides(mut self, storage: &StorageConfig) -> Self {
        if let Some(db) = &storage.database {
            self.database = db.clone();
        }
        if let Some(dir) = &storage.exports_dir {
            self.exports_dir = dir.clone();
        }
        self
    }
}

/// Resolve the default config directory (`~/.eventmanager/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".eventmanager"))
}

/// Resolve the runtime layout under [`config_dir`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    Ok(RuntimePaths::under(&config_dir()?))
}

/// Load config from a TOML file, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or validated.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::info!(path = %path.display(), "loading config from file");
            Config::from_toml(&contents)
                .map_err(|e| anyhow::anyhow!("failed to load config at {}: {e}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}
