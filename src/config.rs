//! Config loading
//!
//! Resolution, lowest to highest precedence:
//!   1. built-in defaults
//!   2. `ALICE_MODEL` / `OLLAMA_HOST` environment variables
//!   3. `<home>/config.toml`
//!   4. command-line flags (applied by the binary)

use crate::commands::CHAOS_RANGE;
use crate::{AliceConfig, AliceError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Keys accepted in `config.toml`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    model: Option<String>,
    host: Option<String>,
    streaming: Option<bool>,
    show_thinking: Option<bool>,
    inject_memory: Option<bool>,
    max_memory_chars: Option<usize>,
    history_turns: Option<usize>,
    chaos_level: Option<u8>,
}

/// Data directory: explicit path, then `$ALICE_HOME`, then `~/.alice`.
pub fn resolve_home(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = explicit {
        return Ok(home);
    }
    if let Ok(home) = std::env::var("ALICE_HOME") {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    let home = dirs::home_dir()
        .ok_or_else(|| AliceError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".alice"))
}

/// Load config for `home` using the process environment.
pub fn load(home: &Path) -> Result<AliceConfig> {
    load_with_env(home, |key| std::env::var(key).ok())
}

/// Load config for `home`, reading environment values through `env`.
pub fn load_with_env(home: &Path, env: impl Fn(&str) -> Option<String>) -> Result<AliceConfig> {
    let mut config = AliceConfig::new(home.to_path_buf());

    if let Some(model) = env("ALICE_MODEL").filter(|v| !v.trim().is_empty()) {
        config.model = model;
    }
    if let Some(host) = env("OLLAMA_HOST").filter(|v| !v.trim().is_empty()) {
        config.host = normalize_host(&host);
    }

    let config_file = config.config_file();
    if config_file.exists() {
        let content = std::fs::read_to_string(&config_file)?;
        let file: ConfigToml = toml::from_str(&content).map_err(|e| {
            AliceError::Config(format!("{}: {}", config_file.display(), e))
        })?;
        apply(&mut config, file)?;
        info!("Loaded config from {}", config_file.display());
    } else {
        debug!("No config file at {}", config_file.display());
    }

    Ok(config)
}

fn apply(config: &mut AliceConfig, file: ConfigToml) -> Result<()> {
    if let Some(model) = file.model {
        config.model = model;
    }
    if let Some(host) = file.host {
        config.host = normalize_host(&host);
    }
    if let Some(streaming) = file.streaming {
        config.streaming = streaming;
    }
    if let Some(show) = file.show_thinking {
        config.show_thinking = show;
    }
    if let Some(inject) = file.inject_memory {
        config.inject_memory = inject;
    }
    if let Some(max_chars) = file.max_memory_chars {
        config.max_memory_chars = max_chars;
    }
    if let Some(turns) = file.history_turns {
        config.history_turns = turns;
    }
    if let Some(level) = file.chaos_level {
        if !CHAOS_RANGE.contains(&level) {
            return Err(AliceError::Config(format!(
                "chaos_level must be 1 to 10, got {level}"
            )));
        }
        config.chaos_level = level;
    }
    Ok(())
}

/// `OLLAMA_HOST` is often given as bare `host:port`.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_HOST, DEFAULT_MODEL};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(config, AliceConfig::new(dir.path().to_path_buf()));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.max_memory_chars, 1800);
        assert_eq!(config.history_turns, 10);
        assert_eq!(config.chaos_level, 7);
    }

    #[test]
    fn test_file_overrides_env() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "model = \"qwen2.5:7b\"\nstreaming = false\nchaos_level = 2\n",
        )
        .unwrap();
        let config = load_with_env(dir.path(), |key| match key {
            "ALICE_MODEL" => Some("from-env".to_string()),
            "OLLAMA_HOST" => Some("10.0.0.5:11434".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.host, "http://10.0.0.5:11434");
        assert!(!config.streaming);
        assert_eq!(config.chaos_level, 2);
    }

    #[test]
    fn test_bad_chaos_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "chaos_level = 11\n").unwrap();
        let err = load_with_env(dir.path(), no_env).unwrap_err();
        assert!(matches!(err, AliceError::Config(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "modle = \"typo\"\n").unwrap();
        assert!(load_with_env(dir.path(), no_env).is_err());
    }

    #[test]
    fn test_resolve_home_explicit() {
        let home = resolve_home(Some(PathBuf::from("/tmp/alice-test"))).unwrap();
        assert_eq!(home, PathBuf::from("/tmp/alice-test"));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("localhost:11434/"), "http://localhost:11434");
        assert_eq!(normalize_host("https://ollama.lan"), "https://ollama.lan");
    }
}
