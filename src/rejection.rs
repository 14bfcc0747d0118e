//! Rejection shapes inspected by classifier predicates.
//!
//! A predicate never reads an error's fields dynamically. Instead every error
//! that flows through a guarded future is viewed through the [`Rejection`]
//! trait, which exposes the optional fields a predicate may care about: a
//! recognizable error code and a human-readable message.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A recognizable error code carried by a rejection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    /// Numeric code, e.g. an HTTP status or an OS errno.
    Numeric(i64),
    /// Textual code, e.g. `"ENOENT"`.
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Numeric(code) => write!(f, "{}", code),
            ErrorCode::Text(code) => write!(f, "{}", code),
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::Numeric(i64::from(code))
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode::Numeric(code)
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

/// The structural view of an error that a classifier predicate inspects.
///
/// Both fields are optional; the defaults report neither.
pub trait Rejection: fmt::Debug {
    /// The error's recognizable code, if any.
    fn code(&self) -> Option<ErrorCode> {
        None
    }

    /// The error's human-readable message, if any.
    fn message(&self) -> Option<String> {
        None
    }
}

impl Rejection for String {
    fn message(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Rejection for &str {
    fn message(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

impl Rejection for std::io::Error {
    fn code(&self) -> Option<ErrorCode> {
        match self.raw_os_error() {
            Some(errno) => Some(ErrorCode::from(errno)),
            None => Some(ErrorCode::Text(format!("{:?}", self.kind()))),
        }
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Rejection for serde_json::Value {
    fn code(&self) -> Option<ErrorCode> {
        match self.get("code")? {
            serde_json::Value::Number(n) => n.as_i64().map(ErrorCode::Numeric),
            serde_json::Value::String(s) => Some(ErrorCode::Text(s.clone())),
            _ => None,
        }
    }

    fn message(&self) -> Option<String> {
        match self {
            serde_json::Value::String(s) => Some(s.clone()),
            other => other
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        }
    }
}

impl<R: Rejection + ?Sized> Rejection for Box<R> {
    fn code(&self) -> Option<ErrorCode> {
        (**self).code()
    }

    fn message(&self) -> Option<String> {
        (**self).message()
    }
}

/// A ready-made operational error with an optional code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    /// Recognizable code, if the failure has one.
    pub code: Option<ErrorCode>,
    /// Human-readable message.
    pub message: String,
}

impl Fault {
    /// Creates a fault without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Sets the fault's code.
    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Rejection for Fault {
    fn code(&self) -> Option<ErrorCode> {
        self.code.clone()
    }

    fn message(&self) -> Option<String> {
        Some(self.message.clone())
    }
}
