//! Viewer configuration and command line.
//!
//! Configuration is stored as JSON in the user's config directory.
//! Default location: ~/.config/dubview/config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Dubbing service base URL, or `file:///dir` for a local project directory
    pub api_base_url: String,
    /// Language code shown for the original (undubbed) track
    pub original_language: String,
    /// Seconds between metadata fetches while a project is still processing
    pub metadata_poll_secs: u64,
    pub preview_width: u32,
    pub preview_height: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            original_language: "en".to_string(),
            metadata_poll_secs: 5,
            preview_width: 1280,
            preview_height: 720,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.metadata_poll_secs.max(1))
    }
}

/// Returns: ~/.config/dubview/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("dubview")
        .join("config.json")
}

/// Load configuration from a JSON file.
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> WatchConfig {
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return WatchConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<WatchConfig>(&contents) {
            Ok(config) => {
                log::info!("load_config: Loaded {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("load_config: Failed to parse {:?}: {}, using defaults", path, e);
                WatchConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: Failed to read {:?}: {}, using defaults", path, e);
            WatchConfig::default()
        }
    }
}

/// Save configuration to a JSON file, creating parent directories.
pub fn save_config(config: &WatchConfig, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub project_id: String,
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    /// Language to select once the project is ready
    pub language: Option<String>,
}

pub const USAGE: &str =
    "usage: dubview <project-id> [--config <path>] [--api <base-url>] [--lang <code>]";

/// Parse arguments (without the program name).
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut project_id = None;
    let mut config_path = None;
    let mut api_base_url = None;
    let mut language = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or("--config needs a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--api" => {
                api_base_url = Some(args.next().ok_or("--api needs a base URL")?);
            }
            "--lang" => {
                language = Some(args.next().ok_or("--lang needs a language code")?);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            _ if project_id.is_none() => project_id = Some(arg),
            _ => return Err(format!("unexpected argument {}", arg)),
        }
    }

    Ok(CliArgs {
        project_id: project_id.ok_or("missing project id")?,
        config_path,
        api_base_url,
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.json"));
        assert_eq!(config, WatchConfig::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert_eq!(load_config(&path), WatchConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"original_language":"pt"}"#).unwrap();
        let config = load_config(&path);
        assert_eq!(config.original_language, "pt");
        assert_eq!(config.metadata_poll_secs, 5);
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = WatchConfig {
            api_base_url: "file:///srv/dubs".into(),
            metadata_poll_secs: 2,
            ..WatchConfig::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_poll_interval_is_at_least_one_second() {
        let config = WatchConfig {
            metadata_poll_secs: 0,
            ..WatchConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(args(&["p1", "--api", "http://dub", "--config", "/tmp/c.json"]))
            .unwrap();
        assert_eq!(parsed.project_id, "p1");
        assert_eq!(parsed.api_base_url.as_deref(), Some("http://dub"));
        assert_eq!(parsed.config_path, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(parsed.language, None);

        let parsed = parse_args(args(&["--lang", "fr", "p1"])).unwrap();
        assert_eq!(parsed.project_id, "p1");
        assert_eq!(parsed.language.as_deref(), Some("fr"));

        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["p1", "--api"])).is_err());
        assert!(parse_args(args(&["p1", "--lang"])).is_err());
        assert!(parse_args(args(&["p1", "--verbose"])).is_err());
        assert!(parse_args(args(&["p1", "p2"])).is_err());
    }
}
