//! File codecs for [`TabularDocument`]s.

use std::fs;
use std::path::Path;

use flex_core::errors::{ErrorInfo, FlexError};
use serde::{Deserialize, Serialize};

use crate::table::TabularDocument;

mod delimited;
mod html;
mod json;
mod pickle;
mod yaml;

pub use delimited::CsvCodec;
pub use html::HtmlCodec;
pub use json::JsonCodec;
pub use pickle::PickleCodec;
pub use yaml::YamlCodec;

pub(crate) use json::kind_of;

/// Whether a save followed by a load reproduces the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    Lossless,
    /// Best-effort format; callers are warned on every use.
    Lossy,
}

/// Saves and loads documents in one concrete file format.
pub trait FormatCodec: Send + Sync {
    /// Short format name used in diagnostics.
    fn name(&self) -> &str;

    fn fidelity(&self) -> Fidelity {
        Fidelity::Lossless
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError>;

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError>;
}

impl std::fmt::Debug for dyn FormatCodec + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatCodec").field("name", &self.name()).finish()
    }
}

/// Tunables for the built-in codecs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    #[serde(default = "default_delimiter")]
    pub csv_delimiter: char,
    #[serde(default = "default_pretty")]
    pub json_pretty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_title: Option<String>,
}

fn default_delimiter() -> char {
    ','
}

fn default_pretty() -> bool {
    true
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            csv_delimiter: default_delimiter(),
            json_pretty: default_pretty(),
            html_title: None,
        }
    }
}

impl CodecOptions {
    pub fn validate(&self) -> Result<(), FlexError> {
        if !self.csv_delimiter.is_ascii() || self.csv_delimiter == '"' {
            return Err(FlexError::Serde(
                ErrorInfo::new("csv-delimiter", "csv delimiter must be a single ascii byte")
                    .with_context("delimiter", self.csv_delimiter.to_string())
                    .with_hint("use ',', ';' or '\\t'"),
            ));
        }
        Ok(())
    }
}

pub(crate) fn io_error(code: &str, path: &Path, err: impl ToString) -> FlexError {
    FlexError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

pub(crate) fn serde_error(code: &str, path: &Path, err: impl ToString) -> FlexError {
    FlexError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), FlexError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| io_error("create-parent", parent, err))?;
        }
    }
    Ok(())
}
