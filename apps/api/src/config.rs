use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables LLM tip phrasing. Templates are used when unset.
    pub anthropic_api_key: Option<String>,
    pub tip_timeout: Duration,
    /// JSON file of extra vocabulary terms merged over the built-in dictionary.
    pub skills_file: Option<PathBuf>,
    pub max_input_chars: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            tip_timeout: Duration::from_millis(8_000),
            skills_file: None,
            max_input_chars: 50_000,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_or("PORT", optional_env("PORT"), defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            tip_timeout: Duration::from_millis(parse_or(
                "TIP_TIMEOUT_MS",
                optional_env("TIP_TIMEOUT_MS"),
                defaults.tip_timeout.as_millis() as u64,
            )?),
            skills_file: optional_env("SKILLS_FILE").map(PathBuf::from),
            max_input_chars: parse_or(
                "MAX_INPUT_CHARS",
                optional_env("MAX_INPUT_CHARS"),
                defaults.max_input_chars,
            )?,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                optional_env("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
        })
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}
