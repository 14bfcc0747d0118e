//! Errors raised by the crate itself.
//!
//! Rejections that flow through a guarded future are never converted into
//! [`GuardError`]; they reach the caller exactly as the wrapped operation
//! produced them.

use thiserror::Error;

/// Failures of attachment and settings loading.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The adapter was attached to a member that is not a method.
    #[error("tuple guard can only be applied to methods, not: {found}")]
    NotCallable {
        /// Name of the offending member.
        member: String,
        /// Type name of the offending member.
        found: &'static str,
    },

    /// No member with this name exists.
    #[error("no member named '{0}'")]
    MissingMember(String),

    /// Settings file not found.
    #[error("settings file not found: {0}")]
    SettingsNotFound(String),

    /// Settings path is not valid UTF-8.
    #[error("invalid settings path: {0}")]
    InvalidPath(String),

    /// Settings could not be parsed or deserialized.
    #[error("settings error: {0}")]
    Settings(#[from] ::config::ConfigError),
}
