//! Startup configuration for fora.
//!
//! Values are resolved in this order, first hit wins:
//! 1. command-line flags,
//! 2. `FORA_*` environment variables (read by clap),
//! 3. the TOML file at `$XDG_CONFIG_HOME/fora/config.toml` (or `--config`),
//! 4. built-in defaults.
//!
//! Only the interview id has no default.

use std::path::{Path, PathBuf};

use clap::Parser;
use fora_core::api::StaticCredentials;
use fora_core::ids::InterviewId;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_THEME: &str = "catppuccin-mocha";
pub const DEFAULT_LOG_FILE: &str = "fora.log";

/// fora: terminal dashboard for interview theme analysis
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file (default: $XDG_CONFIG_HOME/fora/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scheme and host of the analysis service
    #[arg(long, env = "FORA_BASE_URL")]
    pub base_url: Option<String>,

    /// Interview whose topics are shown
    #[arg(short, long, env = "FORA_INTERVIEW")]
    pub interview: Option<String>,

    /// Color theme: "dark" or "catppuccin-mocha"
    #[arg(long)]
    pub theme: Option<String>,

    /// Where log lines are written (the terminal belongs to the dashboard)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, env = "FORA_CSRF_TOKEN", hide = true, hide_env_values = true)]
    pub csrf_token: Option<String>,

    #[arg(long, env = "FORA_SESSION", hide = true, hide_env_values = true)]
    pub session: Option<String>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub interview: Option<String>,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
    pub csrf_token: Option<String>,
    pub session_cookie: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("no interview given (use --interview, FORA_INTERVIEW or `interview` in config.toml)")]
    MissingInterview,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub interview: InterviewId,
    pub theme: String,
    pub log_file: PathBuf,
    pub credentials: StaticCredentials,
}

/// Returns the default config file path.
///
/// Prefers `$XDG_CONFIG_HOME/fora/config.toml`; falls back to
/// `~/.config/fora/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("fora").join("config.toml")
}

/// Reads and parses a config file. A missing file yields `Ok(None)`.
pub fn read_file(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
    };
    toml::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl Config {
    /// Loads the config file named by `args` (or the default path) and merges it.
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file(path)?.ok_or_else(|| ConfigError::Read {
                path: path.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?,
            None => read_file(&config_path())?.unwrap_or_default(),
        };
        Self::resolve(args, file)
    }

    /// Merges flags/environment over the file over defaults.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let interview = non_empty(args.interview)
            .or_else(|| non_empty(file.interview))
            .ok_or(ConfigError::MissingInterview)?;
        let base_url = non_empty(args.base_url)
            .or_else(|| non_empty(file.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let theme = non_empty(args.theme)
            .or_else(|| non_empty(file.theme))
            .unwrap_or_else(|| DEFAULT_THEME.to_owned());
        let log_file = args
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let credentials = StaticCredentials {
            csrf_token: non_empty(args.csrf_token).or_else(|| non_empty(file.csrf_token)),
            session_cookie: non_empty(args.session).or_else(|| non_empty(file.session_cookie)),
        };
        Ok(Self {
            base_url,
            interview: InterviewId::from(interview),
            theme,
            log_file,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn file_values_fill_in_missing_flags() {
        let (_dir, path) = write_config(
            r#"
            base_url = "https://survey.example.org/"
            interview = "42"
            csrf_token = "abc"
            "#,
        );
        let args = Args { config: Some(path), theme: Some("dark".into()), ..Args::default() };
        let config = Config::load(args).unwrap();
        assert_eq!(config.base_url, "https://survey.example.org/");
        assert_eq!(config.interview, InterviewId::from(42));
        assert_eq!(config.theme, "dark");
        assert_eq!(config.credentials.csrf_token.as_deref(), Some("abc"));
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn flags_override_the_file() {
        let file = FileConfig { interview: Some("1".into()), base_url: Some("http://a".into()), ..FileConfig::default() };
        let args = Args { interview: Some("2".into()), ..Args::default() };
        let config = Config::resolve(args, file).unwrap();
        assert_eq!(config.interview, InterviewId::from(2));
        assert_eq!(config.base_url, "http://a");
        assert_eq!(config.theme, DEFAULT_THEME);
    }

    #[test]
    fn interview_is_required() {
        let args = Args { interview: Some("  ".into()), ..Args::default() };
        let err = Config::resolve(args, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInterview));
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(read_file(&dir.path().join("absent.toml")).unwrap(), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_dir, path) = write_config("intervew = \"1\"\n");
        assert!(matches!(read_file(&path), Err(ConfigError::Parse { .. })));
    }
}
