use crate::checker::languagetool::DEFAULT_ENDPOINT;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LOCAL_CONFIG_FILE: &str = ".prosechk.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub api_endpoint: String,
    pub request_timeout_secs: u64,
    pub max_suggestions: usize,

    /// JSON array of built-in technical terms
    pub technical_terms: Option<PathBuf>,

    /// Local copy of learned words
    pub mirror_path: Option<PathBuf>,

    /// File-backed word store, used unless both store URLs are set
    pub word_store_path: Option<PathBuf>,
    pub word_store_read_url: Option<String>,
    pub word_store_write_url: Option<String>,

    /// Re-read the word store on cache misses this often; unset means only
    /// at startup and after learning a word
    pub reconcile_interval_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 10,
            max_suggestions: 5,
            technical_terms: None,
            mirror_path: None,
            word_store_path: None,
            word_store_read_url: None,
            word_store_write_url: None,
            reconcile_interval_secs: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(language: Option<String>, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        } else if explicit.is_some() {
            anyhow::bail!("Config file not found: {}", local_path.display());
        }

        // Apply CLI overrides
        if let Some(language) = language {
            config.language = language;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        let defaults = Self::default();
        if other.language != defaults.language {
            self.language = other.language;
        }
        if other.api_endpoint != defaults.api_endpoint {
            self.api_endpoint = other.api_endpoint;
        }
        if other.request_timeout_secs != defaults.request_timeout_secs {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.max_suggestions != defaults.max_suggestions {
            self.max_suggestions = other.max_suggestions;
        }
        self.technical_terms = other.technical_terms.or(self.technical_terms);
        self.mirror_path = other.mirror_path.or(self.mirror_path);
        self.word_store_path = other.word_store_path.or(self.word_store_path);
        self.word_store_read_url = other.word_store_read_url.or(self.word_store_read_url);
        self.word_store_write_url = other.word_store_write_url.or(self.word_store_write_url);
        self.reconcile_interval_secs = other
            .reconcile_interval_secs
            .or(self.reconcile_interval_secs);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconcile_interval(&self) -> Option<Duration> {
        self.reconcile_interval_secs.map(Duration::from_secs)
    }

    pub fn mirror_path(&self) -> Option<PathBuf> {
        self.mirror_path
            .clone()
            .or_else(|| Self::data_dir().map(|dir| dir.join("learned-words.json")))
    }

    pub fn word_store_path(&self) -> Option<PathBuf> {
        self.word_store_path
            .clone()
            .or_else(|| Self::data_dir().map(|dir| dir.join("custom-words.json")))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "prosechk").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "prosechk").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
