//! Viewer configuration.
//!
//! Loaded from an optional YAML file; every section and field has a default,
//! so an empty file (or none at all) is a valid configuration. Values may use
//! `${VAR}` or `${VAR:-default}` to pull from the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forecast_client::ClientConfig;
use map_view::{LookupMode, OverlayConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_PATH_TEMPLATE: &str = "/rasters/{region}_{model}_{lead}_{period}_{statistic}.tif";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unclosed variable substitution: ${{{0}")]
    UnclosedVariable(String),

    #[error("Environment variable {0} is not set and has no default")]
    MissingVariable(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub service: ServiceConfig,
    pub raster: RasterConfig,
    pub overlay: OverlaySettings,
    pub query: QuerySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Unset means no client-side timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Placeholders: `{region}`, `{model}`, `{lead}`, `{period}`, `{statistic}`.
    pub path_template: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            path_template: DEFAULT_PATH_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub opacity: f32,
    pub retain_on_failure: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        let defaults = OverlayConfig::default();
        Self {
            opacity: defaults.opacity,
            retain_on_failure: defaults.retain_on_failure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryModeSetting {
    #[default]
    Remote,
    Local,
}

impl From<QueryModeSetting> for LookupMode {
    fn from(mode: QueryModeSetting) -> Self {
        match mode {
            QueryModeSetting::Remote => LookupMode::Remote,
            QueryModeSetting::Local => LookupMode::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub mode: QueryModeSetting,
}

// ============================================================================
// Loading
// ============================================================================

impl ViewerConfig {
    /// Load from `path`. A missing file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), base_url = %config.service.base_url, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content, |name| env::var(name).ok())?;
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("service.base_url must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.overlay.opacity) {
            return Err(ConfigError::Invalid(format!(
                "overlay.opacity must be within 0..=1, got {}",
                self.overlay.opacity
            )));
        }
        if self.service.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "service.request_timeout_secs must be positive".into(),
            ));
        }
        if !self.raster.path_template.contains("{model}") && !self.raster.path_template.contains("{region}") {
            warn!(template = %self.raster.path_template, "Raster path template has no selection placeholders");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.service.base_url.clone(),
            request_timeout: self.service.request_timeout_secs.map(Duration::from_secs),
            ..ClientConfig::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            overlay: OverlayConfig {
                opacity: self.overlay.opacity,
                retain_on_failure: self.overlay.retain_on_failure,
                ..OverlayConfig::default()
            },
            lookup: self.query.mode.into(),
        }
    }
}

/// Substitute `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => expr.push(c),
                None => return Err(ConfigError::UnclosedVariable(expr)),
            }
        }

        let value = match expr.split_once(":-") {
            Some((name, default)) => lookup(name).unwrap_or_else(|| default.to_string()),
            None => lookup(&expr).ok_or_else(|| ConfigError::MissingVariable(expr.clone()))?,
        };
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.request_timeout_secs, None);
        assert_eq!(config.overlay.opacity, 0.1);
        assert!(config.overlay.retain_on_failure);
        assert_eq!(config.query.mode, QueryModeSetting::Remote);
        assert!(config.client_config().request_timeout.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
service:
  base_url: http://forecast.example:9000
overlay:
  opacity: 0.5
query:
  mode: local
"#;
        let config = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.service.base_url, "http://forecast.example:9000");
        assert_eq!(config.overlay.opacity, 0.5);
        assert!(config.overlay.retain_on_failure);
        assert_eq!(config.raster.path_template, DEFAULT_PATH_TEMPLATE);

        let session = config.session_config();
        assert_eq!(session.lookup, LookupMode::Local);
        assert_eq!(session.overlay.opacity, 0.5);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ViewerConfig::from_yaml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_timeout_maps_to_client() {
        let config = ViewerConfig::from_yaml("service:\n  request_timeout_secs: 15\n").unwrap();
        assert_eq!(config.client_config().request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_rejects_bad_opacity() {
        let err = ViewerConfig::from_yaml("overlay:\n  opacity: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = ViewerConfig::from_yaml("service:\n  request_timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = ViewerConfig::from_yaml("query:\n  mode: psychic\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_expand_env_vars() {
        let lookup = |name: &str| (name == "HOST").then(|| "forecast.test".to_string());
        assert_eq!(
            expand_env_vars("http://${HOST}:${PORT:-8000}", lookup).unwrap(),
            "http://forecast.test:8000"
        );
        assert_eq!(expand_env_vars("price: $5", no_env).unwrap(), "price: $5");
    }

    #[test]
    fn test_expand_env_vars_errors() {
        assert!(matches!(
            expand_env_vars("${MISSING}", no_env),
            Err(ConfigError::MissingVariable(name)) if name == "MISSING"
        ));
        assert!(matches!(
            expand_env_vars("${OPEN", no_env),
            Err(ConfigError::UnclosedVariable(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ViewerConfig::load(Some(Path::new("/nonexistent/viewer.yaml"))).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(ViewerConfig::load(None).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "raster:\n  path_template: /tif/{{model}}.tif").unwrap();

        let config = ViewerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.raster.path_template, "/tif/{model}.tif");
    }
}
