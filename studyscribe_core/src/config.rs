//! Engine configuration.
//!
//! Defaults match what the watch page and the Android innertube client expect
//! today. A TOML file can override any subset of fields:
//!
//! ```toml
//! timeout_secs = 20
//! default_language = "de"
//! android_client_version = "20.10.38"
//! ```

use crate::error::TranscriptError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "STUDYSCRIBE_CONFIG";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ceiling applied to each network leg separately.
    pub timeout_secs: u64,
    pub default_language: String,
    pub desktop_user_agent: String,
    pub accept_language: String,
    pub android_client_version: String,
    pub android_sdk_version: u32,
    pub android_os_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_language: "en".to_string(),
            desktop_user_agent: DEFAULT_DESKTOP_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            android_client_version: "20.10.38".to_string(),
            android_sdk_version: 30,
            android_os_version: "11".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// User agent of the Android app build being impersonated.
    pub fn android_user_agent(&self) -> String {
        format!(
            "com.google.android.youtube/{} (Linux; U; Android {}) gzip",
            self.android_client_version, self.android_os_version
        )
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranscriptError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TranscriptError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| TranscriptError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `$STUDYSCRIBE_CONFIG`, then the per-user config file, then defaults.
    pub fn load_default() -> Result<Self, TranscriptError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_from_path(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), TranscriptError> {
        if self.timeout_secs == 0 {
            return Err(TranscriptError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.default_language.trim().is_empty() {
            return Err(TranscriptError::Config(
                "default_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/studyscribe/config.toml` on Unix, `%APPDATA%/studyscribe/config.toml` on Windows.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
        .map(|base| base.join("studyscribe").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let config = EngineConfig::from_toml_str("timeout_secs = 10\n").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.default_language, "en");
        assert_eq!(config.android_sdk_version, 30);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = EngineConfig::from_toml_str("timeout_secs = 0").unwrap_err();
        assert!(matches!(err, TranscriptError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = EngineConfig::from_toml_str("timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, TranscriptError::Config(_)));
    }

    #[test]
    fn test_android_user_agent() {
        let config = EngineConfig::default();
        assert_eq!(
            config.android_user_agent(),
            "com.google.android.youtube/20.10.38 (Linux; U; Android 11) gzip"
        );
    }
}
