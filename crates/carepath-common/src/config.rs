//! Configuration loading for CarePath.
//! Reads carepath.toml from the current directory or the path in the
//! CAREPATH_CONFIG env var. A missing file falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TriageError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 4015 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Rule-based triage ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Optional knowledge base file (.toml, .json, .yaml). Built-in tables when unset.
    pub knowledge_base: Option<PathBuf>,
    #[serde(default = "default_specialist_threshold")]
    pub specialist_threshold: f64,
    #[serde(default = "default_self_care_threshold")]
    pub self_care_threshold: f64,
}

fn default_specialist_threshold() -> f64 { 0.60 }
fn default_self_care_threshold()  -> f64 { 0.30 }

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            knowledge_base: None,
            specialist_threshold: default_specialist_threshold(),
            self_care_threshold: default_self_care_threshold(),
        }
    }
}

// ── Statistical classifier ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Exported model artifact. The classifier endpoints are disabled when unset.
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_top_k() -> usize                { 5 }
fn default_confidence_threshold() -> f64   { 0.60 }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            top_k: default_top_k(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

// ── Fallback client ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String { "http://127.0.0.1:4015".to_string() }
fn default_timeout_ms() -> u64  { 3_000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_ms: default_timeout_ms() }
    }
}

// ── Logging ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; RUST_LOG takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "info,tower_http=debug".to_string() }

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

impl Config {
    /// Load configuration from carepath.toml.
    /// Checks CAREPATH_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CAREPATH_CONFIG")
            .unwrap_or_else(|_| "carepath.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            tracing::info!(path = %path, "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply CAREPATH_HOST, CAREPATH_PORT, CAREPATH_MODEL_PATH and ML_CONF_THRESHOLD.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CAREPATH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CAREPATH_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| TriageError::Config(format!("CAREPATH_PORT is not a valid port: {e}")))?;
        }
        if let Some(model) = lookup("CAREPATH_MODEL_PATH") {
            self.classifier.model_path = Some(PathBuf::from(model));
        }
        if let Some(threshold) = lookup("ML_CONF_THRESHOLD") {
            self.classifier.confidence_threshold = threshold
                .parse()
                .map_err(|e| TriageError::Config(format!("ML_CONF_THRESHOLD is not a number: {e}")))?;
        }
        Ok(())
    }

    /// Reject thresholds outside `[0, 1]`, a self-care threshold above the
    /// specialist threshold, and a zero `top_k`.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| -> Result<()> {
            if !(0.0..=1.0).contains(&v) {
                return Err(TriageError::Config(format!("{name} must be within [0, 1], got {v}")));
            }
            Ok(())
        };
        unit("triage.specialist_threshold", self.triage.specialist_threshold)?;
        unit("triage.self_care_threshold", self.triage.self_care_threshold)?;
        unit("classifier.confidence_threshold", self.classifier.confidence_threshold)?;
        if self.triage.self_care_threshold > self.triage.specialist_threshold {
            return Err(TriageError::Config(format!(
                "triage.self_care_threshold ({}) exceeds triage.specialist_threshold ({})",
                self.triage.self_care_threshold, self.triage.specialist_threshold
            )));
        }
        if self.classifier.top_k == 0 {
            return Err(TriageError::Config("classifier.top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}
