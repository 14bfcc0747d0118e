//! Declarative classifier settings.
//!
//! Settings are loaded from a TOML file layered with environment overrides
//! (`TUPLE_GUARD__CLASSIFIER__REQUIRE_CODE=true`), then turned into a
//! [`GuardConfig`] and a [`LoggingConfig`].
//!
//! ```toml
//! [classifier]
//! mode = "rules"
//! capture_codes = [404, "ENOENT"]
//! require_code = true
//!
//! [logging]
//! level = "debug"
//! ```

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use crate::config::{configure, GuardConfig};
use crate::error::GuardError;
use crate::logging::{LogLevel, LoggingConfig};
use crate::rejection::{ErrorCode, Rejection};

/// How the classifier is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// No predicate, every rejection is captured.
    #[default]
    Capture,
    /// Build a predicate from the code rules.
    Rules,
}

/// The `[classifier]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierSettings {
    /// Whether to capture everything or build a rule predicate.
    #[serde(default)]
    pub mode: ClassifierMode,
    /// Codes of expected errors. Empty means "any code".
    #[serde(default)]
    pub capture_codes: Vec<ErrorCode>,
    /// Propagate errors that carry no code at all.
    #[serde(default)]
    pub require_code: bool,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Subscriber level, overridden by `RUST_LOG`.
    #[serde(default)]
    pub level: LogLevel,
    /// Include timestamps in each line.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Include the event target in each line.
    #[serde(default = "default_true")]
    pub target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            timestamps: true,
            target: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a TOML file, with `TUPLE_GUARD__` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GuardError> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| GuardError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(GuardError::SettingsNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::new(path_str, FileFormat::Toml))
            .add_source(
                Environment::with_prefix("TUPLE_GUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse settings from a TOML string. No environment overrides.
    pub fn from_toml_str(content: &str) -> Result<Self, GuardError> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Build the classifier configuration described by these settings.
    pub fn guard_config(&self) -> GuardConfig {
        let classifier = &self.classifier;
        if classifier.mode == ClassifierMode::Capture {
            return GuardConfig::default();
        }

        let codes = classifier.capture_codes.clone();
        let require_code = classifier.require_code;
        GuardConfig::new().with_predicate(move |error: &dyn Rejection| match error.code() {
            Some(code) if !codes.is_empty() => codes.contains(&code),
            Some(_) => true,
            None => codes.is_empty() && !require_code,
        })
    }

    /// Build the subscriber configuration described by these settings.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new()
            .with_level(self.logging.level)
            .with_timestamps(self.logging.timestamps)
            .with_target(self.logging.target)
    }

    /// Install the classifier globally and return the logging configuration.
    pub fn apply(&self) -> LoggingConfig {
        configure(self.guard_config());
        self.logging_config()
    }
}
