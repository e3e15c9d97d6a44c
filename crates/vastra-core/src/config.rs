//! Configuration management for Vastra.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, VastraError};
use crate::session::{CapacityPolicy, SessionLimits};

/// Top-level Vastra configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VastraConfig {
    /// Session key used when a request carries none.
    #[serde(default = "default_session")]
    pub default_session: String,

    /// Session memory limits and eviction.
    #[serde(default)]
    pub memory: MemorySettings,

    /// Language detection.
    #[serde(default)]
    pub language: LanguageSettings,

    /// HTTP server.
    #[serde(default)]
    pub server: ServerSettings,

    /// Response templates.
    #[serde(default)]
    pub templates: TemplateSettings,
}

fn default_session() -> String {
    "default".to_string()
}

impl Default for VastraConfig {
    fn default() -> Self {
        Self {
            default_session: default_session(),
            memory: MemorySettings::default(),
            language: LanguageSettings::default(),
            server: ServerSettings::default(),
            templates: TemplateSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Messages kept per session.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// History entries consulted by the scope check.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Keywords kept per session.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Recent keywords consulted for keyword links.
    #[serde(default = "default_link_window")]
    pub link_window: usize,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Fraction of `max_sessions` that triggers a purge.
    #[serde(default = "default_cleanup_threshold")]
    pub cleanup_threshold: f64,

    #[serde(default = "default_inactive_timeout_secs")]
    pub inactive_timeout_secs: u64,

    /// Background sweep cadence; 0 disables the sweeper.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_max_history() -> usize {
    15_000
}
fn default_context_window() -> usize {
    300
}
fn default_max_keywords() -> usize {
    75
}
fn default_link_window() -> usize {
    15
}
fn default_max_sessions() -> usize {
    1000
}
fn default_cleanup_threshold() -> f64 {
    0.8
}
fn default_inactive_timeout_secs() -> u64 {
    3600
}
fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            context_window: default_context_window(),
            max_keywords: default_max_keywords(),
            link_window: default_link_window(),
            max_sessions: default_max_sessions(),
            cleanup_threshold: default_cleanup_threshold(),
            inactive_timeout_secs: default_inactive_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl MemorySettings {
    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_history: self.max_history,
            max_keywords: self.max_keywords,
        }
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        CapacityPolicy {
            max_sessions: self.max_sessions,
            cleanup_threshold: self.cleanup_threshold,
            inactive_timeout: Duration::from_secs(self.inactive_timeout_secs),
        }
    }

    /// `None` when the background sweeper is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

/// Which language detector to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Unicode-script heuristic, no network.
    #[default]
    Script,
    /// External HTTP detection service.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSettings {
    /// Language used when detection fails.
    #[serde(default = "default_language")]
    pub default: String,

    #[serde(default)]
    pub detector: DetectorKind,

    /// Detection service URL (for `detector = "http"`).
    pub endpoint: Option<String>,

    /// Detection deadline per turn.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_language() -> String {
    "en".to_string()
}
fn default_timeout_ms() -> u64 {
    250
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            default: default_language(),
            detector: DetectorKind::default(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LanguageSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Requests per minute per client; 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_true() -> bool {
    true
}
fn default_rate_limit() -> u32 {
    120
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// TOML file whose bodies override the built-in catalog.
    pub path: Option<PathBuf>,
}

impl VastraConfig {
    /// Load config from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| VastraError::Config(format!("Failed to read config: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| VastraError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VastraError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vastra")
            .join("config.toml")
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let m = &self.memory;
        if !(m.cleanup_threshold > 0.0 && m.cleanup_threshold <= 1.0) {
            return Err(VastraError::Config(format!(
                "memory.cleanup_threshold must be in (0, 1], got {}",
                m.cleanup_threshold
            )));
        }
        for (name, value) in [
            ("max_history", m.max_history),
            ("context_window", m.context_window),
            ("max_keywords", m.max_keywords),
            ("link_window", m.link_window),
            ("max_sessions", m.max_sessions),
        ] {
            if value == 0 {
                return Err(VastraError::Config(format!("memory.{name} must be non-zero")));
            }
        }
        if self.default_session.trim().is_empty() {
            return Err(VastraError::Config("default_session must not be empty".to_string()));
        }
        if self.language.detector == DetectorKind::Http && self.language.endpoint.is_none() {
            return Err(VastraError::Config(
                "language.endpoint is required when detector = \"http\"".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = VastraConfig::default();
        assert_eq!(c.default_session, "default");
        assert_eq!(c.memory.max_history, 15_000);
        assert_eq!(c.memory.context_window, 300);
        assert_eq!(c.memory.max_keywords, 75);
        assert_eq!(c.memory.link_window, 15);
        assert_eq!(c.memory.capacity_policy(), CapacityPolicy::default());
        assert_eq!(c.server.port, 5000);
        assert_eq!(c.language.detector, DetectorKind::Script);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = VastraConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(c.language.default, "en");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[memory]\nmax_keywords = 10\n\n[language]\ndetector = \"http\"\nendpoint = \"http://localhost:8000/detect\"\n",
        )
        .unwrap();

        let c = VastraConfig::load(&path).unwrap();
        assert_eq!(c.memory.max_keywords, 10);
        assert_eq!(c.memory.max_history, 15_000);
        assert_eq!(c.language.detector, DetectorKind::Http);
        assert_eq!(c.server.host, "127.0.0.1");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut c = VastraConfig::default();
        c.server.port = 8088;
        c.memory.sweep_interval_secs = 0;
        c.save(&path).unwrap();

        let back = VastraConfig::load(&path).unwrap();
        assert_eq!(back.server.port, 8088);
        assert!(back.memory.sweep_interval().is_none());
    }

    #[test]
    fn test_validation() {
        let mut c = VastraConfig::default();
        c.memory.cleanup_threshold = 1.5;
        assert!(matches!(c.validate(), Err(VastraError::Config(_))));

        let mut c = VastraConfig::default();
        c.memory.max_keywords = 0;
        assert!(c.validate().is_err());

        let mut c = VastraConfig::default();
        c.language.detector = DetectorKind::Http;
        assert!(c.validate().is_err());
    }
}
