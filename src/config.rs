use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Artery Party";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openrouter/free";
pub const DEFAULT_CVD_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful cardiovascular health assistant.";

/// Upstream budget for the feedback model, below the browser's own 40s abort.
pub const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 17;
pub const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "artery_party=info,tower_http=info"
}

/// Default application data directory: ~/ArteryParty/
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join("ArteryParty"))
}

/// Path of the assessment history database inside `data_dir`.
pub fn history_db_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("history.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cannot determine home directory")]
    NoHomeDirectory,
}

/// Which backend answers risk predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionMode {
    /// Forward to the model service at this base URL.
    Remote(String),
    /// Score locally with the point heuristic.
    Heuristic,
}

/// Everything the service reads from its environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub openrouter_api_key: String,
    pub openrouter_url: String,
    pub openrouter_model: String,
    pub feedback_timeout: Duration,
    pub prediction: PredictionMode,
    pub prediction_timeout: Duration,
    pub groq_api_key: Option<String>,
    pub groq_url: String,
    pub groq_model: String,
    pub system_prompt: String,
    pub chat_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let openrouter_api_key = lookup("OPENROUTER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let addr_raw = var("ARTERY_PARTY_ADDR", DEFAULT_ADDR);
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "ARTERY_PARTY_ADDR",
                value: addr_raw.clone(),
            })?;

        let data_dir = match lookup("ARTERY_PARTY_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => app_data_dir()?,
        };

        let prediction = match var("CVD_PREDICTION_MODE", "remote").as_str() {
            "remote" => PredictionMode::Remote(var("CVD_API_URL", DEFAULT_CVD_API_URL)),
            "heuristic" => PredictionMode::Heuristic,
            other => {
                return Err(ConfigError::InvalidValue {
                    var: "CVD_PREDICTION_MODE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            addr,
            data_dir,
            openrouter_api_key,
            openrouter_url: var("OPENROUTER_URL", DEFAULT_OPENROUTER_URL),
            openrouter_model: var("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
            feedback_timeout: secs(&lookup, "FEEDBACK_TIMEOUT_SECS", DEFAULT_FEEDBACK_TIMEOUT_SECS)?,
            prediction,
            prediction_timeout: secs(
                &lookup,
                "PREDICTION_TIMEOUT_SECS",
                DEFAULT_PREDICTION_TIMEOUT_SECS,
            )?,
            groq_api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            groq_url: var("GROQ_URL", DEFAULT_GROQ_URL),
            groq_model: var("GROQ_MODEL", DEFAULT_GROQ_MODEL),
            system_prompt: var("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            chat_timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            max_upload_bytes: number(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn number<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    number(lookup, var, default).map(Duration::from_secs)
}
