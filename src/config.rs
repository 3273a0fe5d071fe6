use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "PhysiqueEval";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 12;
pub const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5000/reports";

/// Get the application data directory
/// ~/PhysiqueEval/ (falls back to the working directory without a home)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of rendered report documents
pub fn default_reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Default tracing filter when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "physique_eval=info,tower_http=info"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// How a successful evaluation is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Report body returned as `text/plain`.
    #[default]
    Inline,
    /// Report rendered to PDF, stored, and referenced by URL.
    Document,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Document => write!(f, "document"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "text" => Ok(Self::Inline),
            "document" | "pdf" => Ok(Self::Document),
            other => Err(format!("expected 'inline' or 'document', got '{other}'")),
        }
    }
}

/// Service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub vision_model: String,
    pub report_model: String,
    pub vision_timeout: Duration,
    pub report_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub reports_dir: PathBuf,
    pub public_base_url: String,
    pub output_mode: OutputMode,
}

impl AppConfig {
    /// Defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            vision_model: DEFAULT_MODEL.to_string(),
            report_model: DEFAULT_MODEL.to_string(),
            vision_timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
            report_timeout: Duration::from_secs(DEFAULT_REPORT_TIMEOUT_SECS),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            reports_dir: default_reports_dir(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            output_mode: OutputMode::Inline,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;
        let mut config = Self::new(api_key.trim());

        if let Some(v) = get("PHYSIQUE_API_BASE_URL") {
            url::Url::parse(&v).map_err(|e| invalid("PHYSIQUE_API_BASE_URL", &v, e))?;
            config.api_base_url = v;
        }
        if let Some(v) = get("PHYSIQUE_VISION_MODEL") {
            config.vision_model = v;
        }
        if let Some(v) = get("PHYSIQUE_REPORT_MODEL") {
            config.report_model = v;
        }
        if let Some(v) = get("PHYSIQUE_VISION_TIMEOUT_SECS") {
            config.vision_timeout = parse_timeout("PHYSIQUE_VISION_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("PHYSIQUE_REPORT_TIMEOUT_SECS") {
            config.report_timeout = parse_timeout("PHYSIQUE_REPORT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("PHYSIQUE_BIND_ADDR") {
            config.bind_addr = v
                .trim()
                .parse()
                .map_err(|e| invalid("PHYSIQUE_BIND_ADDR", &v, e))?;
        }
        if let Some(v) = get("PHYSIQUE_REPORTS_DIR") {
            config.reports_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PHYSIQUE_PUBLIC_BASE_URL") {
            url::Url::parse(&v).map_err(|e| invalid("PHYSIQUE_PUBLIC_BASE_URL", &v, e))?;
            config.public_base_url = v;
        }
        if let Some(v) = get("PHYSIQUE_OUTPUT_MODE") {
            config.output_mode = v
                .parse()
                .map_err(|e: String| invalid("PHYSIQUE_OUTPUT_MODE", &v, e))?;
        }

        Ok(config)
    }
}

fn parse_timeout(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid(key, value, "must be at least 1 second")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(invalid(key, value, e)),
    }
}

fn invalid(key: &'static str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("PhysiqueEval"));
        assert!(default_reports_dir().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_apply_when_only_key_set() {
        let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.vision_model, "gpt-4o");
        assert_eq!(config.report_model, "gpt-4o");
        assert_eq!(config.vision_timeout, Duration::from_secs(12));
        assert_eq!(config.report_timeout, Duration::from_secs(15));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.public_base_url, DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.output_mode, OutputMode::Inline);
    }

    #[test]
    fn missing_or_blank_key_is_an_error() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("OPENAI_API_KEY")
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err(),
            ConfigError::Missing("OPENAI_API_KEY")
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PHYSIQUE_VISION_MODEL", "gpt-4o-mini"),
            ("PHYSIQUE_VISION_TIMEOUT_SECS", "30"),
            ("PHYSIQUE_BIND_ADDR", "127.0.0.1:8080"),
            ("PHYSIQUE_REPORTS_DIR", "/tmp/reports"),
            ("PHYSIQUE_OUTPUT_MODE", "Document"),
        ]))
        .unwrap();
        assert_eq!(config.vision_model, "gpt-4o-mini");
        assert_eq!(config.vision_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.output_mode, OutputMode::Document);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("PHYSIQUE_VISION_TIMEOUT_SECS", "soon"),
            ("PHYSIQUE_REPORT_TIMEOUT_SECS", "0"),
            ("PHYSIQUE_BIND_ADDR", "localhost"),
            ("PHYSIQUE_OUTPUT_MODE", "html"),
            ("PHYSIQUE_PUBLIC_BASE_URL", "not a url"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} should be invalid"
            );
        }
    }

    #[test]
    fn output_mode_parses_aliases() {
        assert_eq!("pdf".parse::<OutputMode>().unwrap(), OutputMode::Document);
        assert_eq!(" INLINE ".parse::<OutputMode>().unwrap(), OutputMode::Inline);
        assert!("xml".parse::<OutputMode>().is_err());
    }
}
