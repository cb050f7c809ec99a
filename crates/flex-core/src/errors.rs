//! Structured error and warning types shared across flex crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`FlexError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, row counts, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for flex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum FlexError {
    /// No codec is registered for the file extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(ErrorInfo),
    /// Row count does not match what the operation expects.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// A row was requested from a document that has none.
    #[error("empty document: {0}")]
    EmptyDocument(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Encoding and decoding failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl FlexError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            FlexError::UnsupportedFormat(info)
            | FlexError::Shape(info)
            | FlexError::EmptyDocument(info)
            | FlexError::Io(info)
            | FlexError::Serde(info) => info,
        }
    }

    /// Builds a shape error for an operation that needed `expected` rows.
    pub fn shape(code: &str, expected: &str, actual: usize) -> Self {
        FlexError::Shape(
            ErrorInfo::new(code, format!("expected {expected} row(s), found {actual}"))
                .with_context("expected", expected)
                .with_context("actual", actual.to_string()),
        )
    }

    /// Builds an empty document error naming the document that was read.
    pub fn empty(code: &str, document: &str) -> Self {
        FlexError::EmptyDocument(
            ErrorInfo::new(code, format!("{document} holds no rows"))
                .with_context("document", document),
        )
    }
}

/// Which constructor input a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputTarget {
    /// The current configuration input.
    Config,
    /// The historical log input.
    Logs,
}

impl Display for InputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputTarget::Config => f.write_str("config"),
            InputTarget::Logs => f.write_str("logs"),
        }
    }
}

/// Direction of a codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecOperation {
    /// Document was written to disk.
    Save,
    /// Document was read from disk.
    Load,
}

/// Non-fatal conditions recorded for the caller to inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlexWarning {
    /// A lossy codec was used; a later load may not reproduce the document.
    RoundTripFidelity {
        /// Format key of the codec.
        format: String,
        /// File the codec touched.
        path: String,
        /// Whether the file was saved or loaded.
        operation: CodecOperation,
    },
    /// Input was absent or of an unsupported shape and was replaced by an empty document.
    UnsupportedInput {
        /// Which input was affected.
        target: InputTarget,
        /// Description of what was received.
        detail: String,
    },
    /// The current config names no `config_file`, so nothing was persisted or loaded.
    NoDefaultConfigFile {
        /// Whether a save or a load was requested.
        operation: CodecOperation,
    },
}

impl Display for FlexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexWarning::RoundTripFidelity {
                format,
                path,
                operation,
            } => write!(
                f,
                "{format} codec is lossy ({operation:?} {path}); round trip is not guaranteed"
            ),
            FlexWarning::UnsupportedInput { target, detail } => write!(
                f,
                "no {target} records loaded ({detail}); expected on a first run, otherwise prior records will be overwritten"
            ),
            FlexWarning::NoDefaultConfigFile { operation } => {
                write!(f, "no config_file field defined; {operation:?} skipped")
            }
        }
    }
}
