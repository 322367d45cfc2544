use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Path of the diagram endpoint, appended to the backend base URL.
pub const GENERATE_PATH: &str = "/generate_mermaid";

#[derive(Debug, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
    #[serde(default = "default_backend_url")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Storage {
    /// Overrides `~/.mermaid-terminal/preferences.toml`.
    pub preferences: Option<PathBuf>,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".into()
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            storage: Storage::default(),
        }
    }
}

impl TerminalConfig {
    /// Resolve the backend base URL.
    /// Search order: MERMAID_TERMINAL_BACKEND env var > config file field
    pub fn backend_url(&self) -> String {
        if let Ok(url) = std::env::var("MERMAID_TERMINAL_BACKEND") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        self.backend.url.clone()
    }

    /// Full URL of the generate endpoint.
    pub fn generate_url(&self) -> String {
        join_endpoint(&self.backend_url())
    }

    /// Where the theme preference is persisted.
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.storage
            .preferences
            .clone()
            .or_else(|| data_dir().map(|d| d.join("preferences.toml")))
    }
}

fn join_endpoint(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), GENERATE_PATH)
}

/// `~/.mermaid-terminal`
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mermaid-terminal"))
}

/// Load the terminal config file.
/// Search order:
///   1. MERMAID_TERMINAL_CONFIG env var
///   2. ~/.mermaid-terminal/config.toml
///   3. Default values
pub fn load() -> TerminalConfig {
    let candidates = [
        std::env::var("MERMAID_TERMINAL_CONFIG").ok().map(PathBuf::from),
        data_dir().map(|d| d.join("config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            match fs::read_to_string(&candidate) {
                Ok(content) => match toml::from_str::<TerminalConfig>(&content) {
                    Ok(config) => {
                        info!(
                            path = %candidate.display(),
                            backend = %config.backend.url,
                            "loaded terminal config"
                        );
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %candidate.display(), error = %e, "failed to parse config");
                    }
                },
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "failed to read config");
                }
            }
        }
    }

    info!("no config file found, using defaults");
    TerminalConfig::default()
}
