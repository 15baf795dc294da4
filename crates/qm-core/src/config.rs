use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Base endpoint of the 1secmail API.
pub const DEFAULT_API_BASE_URL: &str = "https://www.1secmail.com/api/v1/";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Mail provider
    pub api_base_url: String,
    pub api_timeout: Option<Duration>,

    // Files
    pub log_file: PathBuf,
    pub temp_dir: PathBuf,

    // Telegram limits
    pub telegram_safe_limit: usize,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let cfg = Self::from_lookup(env_str)?;

        // Downloads are staged here before being sent as documents.
        fs::create_dir_all(&cfg.temp_dir)?;

        Ok(cfg)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let api_base_url = lookup("MAIL_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_timeout = lookup("MAIL_API_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let log_file = lookup("LOG_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bot.log"));
        let temp_dir = lookup("TEMP_DIR")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("quickmail-bot"));

        let telegram_safe_limit = lookup("TELEGRAM_SAFE_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(4000);

        Ok(Self {
            telegram_bot_token,
            api_base_url,
            api_timeout,
            log_file,
            temp_dir,
            telegram_safe_limit,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
