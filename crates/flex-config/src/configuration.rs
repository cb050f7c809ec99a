//! Public entry point: config and history management with file persistence.

use std::path::{Path, PathBuf};

use flex_core::errors::{CodecOperation, FlexError, FlexWarning, InputTarget};
use serde_json::Value;
use tracing::warn;

use crate::attribs::{AttribGroups, ExperimentAttribs};
use crate::codec::{kind_of, serde_error, Fidelity};
use crate::registry::FormatRegistry;
use crate::scalar::Record;
use crate::store::ConfigStore;
use crate::table::TabularDocument;

/// Field of the current config naming its default persistence path.
pub const CONFIG_FILE_FIELD: &str = "config_file";

/// The shapes a config or log input may arrive in.
#[derive(Debug, Clone, Default)]
pub enum ConfigInput {
    /// Nothing given; resolves to an empty document and a warning.
    #[default]
    None,
    Document(TabularDocument),
    Mapping(Record),
    /// File dispatched through the [`FormatRegistry`] by extension.
    Path(PathBuf),
    /// An object is one row, an array of objects is many rows, anything else
    /// is unsupported and resolves like [`ConfigInput::None`].
    Json(Value),
}

impl From<TabularDocument> for ConfigInput {
    fn from(doc: TabularDocument) -> Self {
        ConfigInput::Document(doc)
    }
}

impl From<Record> for ConfigInput {
    fn from(record: Record) -> Self {
        ConfigInput::Mapping(record)
    }
}

impl From<PathBuf> for ConfigInput {
    fn from(path: PathBuf) -> Self {
        ConfigInput::Path(path)
    }
}

impl From<&Path> for ConfigInput {
    fn from(path: &Path) -> Self {
        ConfigInput::Path(path.to_path_buf())
    }
}

impl From<&str> for ConfigInput {
    fn from(path: &str) -> Self {
        ConfigInput::Path(PathBuf::from(path))
    }
}

impl From<Value> for ConfigInput {
    fn from(value: Value) -> Self {
        ConfigInput::Json(value)
    }
}

impl<T: Into<ConfigInput>> From<Option<T>> for ConfigInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(ConfigInput::None, Into::into)
    }
}

/// Config and run history of one experiment session.
///
/// Non-fatal conditions (no history given, lossy formats, no default config
/// file) are collected in [`Configuration::warnings`] and logged through
/// `tracing`. File writes are not atomic; write to a temporary path and rename
/// when crash safety matters.
#[derive(Debug)]
pub struct Configuration {
    store: ConfigStore,
    registry: FormatRegistry,
    warnings: Vec<FlexWarning>,
}

impl Configuration {
    pub fn new(
        config: impl Into<ConfigInput>,
        logs: impl Into<ConfigInput>,
    ) -> Result<Self, FlexError> {
        Self::with_registry(FormatRegistry::new(), config, logs)
    }

    pub fn with_registry(
        registry: FormatRegistry,
        config: impl Into<ConfigInput>,
        logs: impl Into<ConfigInput>,
    ) -> Result<Self, FlexError> {
        let mut configuration = Self {
            store: ConfigStore::new(),
            registry,
            warnings: Vec::new(),
        };
        let logs = configuration.resolve(logs.into(), InputTarget::Logs)?;
        let config = configuration.resolve(config.into(), InputTarget::Config)?;
        configuration.store = ConfigStore::with_state(logs, config)?;
        Ok(configuration)
    }

    /// Builds the config from separate metadata, parameter and result groups.
    pub fn from_parts(
        meta: Record,
        params: Record,
        results: Record,
        logs: impl Into<ConfigInput>,
    ) -> Result<Self, FlexError> {
        let config = ExperimentAttribs::from_records(meta, params, results).merge()?;
        Self::new(config, logs)
    }

    pub fn save_config(&mut self, path: impl AsRef<Path>) -> Result<(), FlexError> {
        let doc = self.store.current_document()?.clone();
        self.save_document(&doc, path.as_ref())
    }

    /// Loads a single-row file as the new current config; it is appended to the log.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<(), FlexError> {
        let doc = self.load_document(path.as_ref())?;
        self.store.set_config(doc)
    }

    pub fn save_logs(&mut self, path: impl AsRef<Path>) -> Result<(), FlexError> {
        let doc = self.store.logs().clone();
        self.save_document(&doc, path.as_ref())
    }

    /// Replaces the log with the file's rows, followed by the current config.
    pub fn load_logs(&mut self, path: impl AsRef<Path>) -> Result<(), FlexError> {
        let doc = self.load_document(path.as_ref())?;
        self.store.set_logs(doc);
        Ok(())
    }

    /// Imports historical rows without changing the current config.
    pub fn append_logs(&mut self, logs: impl Into<ConfigInput>) -> Result<(), FlexError> {
        let doc = self.resolve(logs.into(), InputTarget::Logs)?;
        self.store.append(&doc);
        Ok(())
    }

    /// Adds or overwrites fields of the current config, e.g. results after a run.
    pub fn add_config_attribs(&mut self, fields: &Record) -> Result<(), FlexError> {
        self.store.edit_config(fields)
    }

    pub fn config(&self) -> Result<Record, FlexError> {
        self.store.current_config()
    }

    /// Replaces the current config and appends it to the log.
    pub fn set_config(&mut self, config: impl Into<ConfigInput>) -> Result<(), FlexError> {
        let doc = self.resolve(config.into(), InputTarget::Config)?;
        self.store.set_config(doc)
    }

    pub fn logs(&self) -> &TabularDocument {
        self.store.logs()
    }

    /// Replaces the log; the current config is appended after it.
    pub fn set_logs(&mut self, logs: impl Into<ConfigInput>) -> Result<(), FlexError> {
        let doc = self.resolve(logs.into(), InputTarget::Logs)?;
        self.store.set_logs(doc);
        Ok(())
    }

    /// Default view for orchestration code: the current config row.
    pub fn current(&self) -> Result<Record, FlexError> {
        self.config()
    }

    /// Saves the current config to the path in its `config_file` field.
    /// Returns `Ok(None)` and records a warning when that field is absent.
    pub fn save_config_to_default(&mut self) -> Result<Option<PathBuf>, FlexError> {
        let Some(path) = self.default_config_file(CodecOperation::Save)? else {
            return Ok(None);
        };
        self.save_config(&path)?;
        Ok(Some(path))
    }

    /// Reloads the current config from the path in its `config_file` field.
    /// Returns `Ok(None)` and records a warning when that field is absent.
    pub fn load_config_from_default(&mut self) -> Result<Option<PathBuf>, FlexError> {
        let Some(path) = self.default_config_file(CodecOperation::Load)? else {
            return Ok(None);
        };
        self.load_config(&path)?;
        Ok(Some(path))
    }

    /// Splits the full history into metadata, parameter and result columns.
    pub fn attribs(&self, groups: &AttribGroups) -> Result<ExperimentAttribs, FlexError> {
        groups.split(self.store.logs())
    }

    pub fn warnings(&self) -> &[FlexWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<FlexWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FormatRegistry {
        &mut self.registry
    }

    fn default_config_file(
        &mut self,
        operation: CodecOperation,
    ) -> Result<Option<PathBuf>, FlexError> {
        let current = self.store.current_config()?;
        match current.field(CONFIG_FILE_FIELD).as_str() {
            Some(path) if !path.is_empty() => Ok(Some(PathBuf::from(path))),
            _ => {
                self.record(FlexWarning::NoDefaultConfigFile { operation });
                Ok(None)
            }
        }
    }

    fn resolve(
        &mut self,
        input: ConfigInput,
        target: InputTarget,
    ) -> Result<TabularDocument, FlexError> {
        match input {
            ConfigInput::None => {
                self.record(FlexWarning::UnsupportedInput {
                    target,
                    detail: "no input given".into(),
                });
                Ok(TabularDocument::empty())
            }
            ConfigInput::Document(doc) => Ok(doc),
            ConfigInput::Mapping(record) => Ok(TabularDocument::from_record(record)),
            ConfigInput::Path(path) => self.load_document(&path),
            ConfigInput::Json(value) => self.resolve_json(value, target),
        }
    }

    fn resolve_json(
        &mut self,
        value: Value,
        target: InputTarget,
    ) -> Result<TabularDocument, FlexError> {
        let origin = Path::new("<json input>");
        match value {
            Value::Object(_) => {
                let record: Record = serde_json::from_value(value)
                    .map_err(|err| serde_error("json-input", origin, err))?;
                Ok(TabularDocument::from_record(record))
            }
            Value::Array(_) => {
                let records: Vec<Record> = serde_json::from_value(value)
                    .map_err(|err| serde_error("json-input", origin, err))?;
                Ok(TabularDocument::from_rows(records))
            }
            other => {
                self.record(FlexWarning::UnsupportedInput {
                    target,
                    detail: format!("unsupported json {}", kind_of(&other)),
                });
                Ok(TabularDocument::empty())
            }
        }
    }

    fn load_document(&mut self, path: &Path) -> Result<TabularDocument, FlexError> {
        let fidelity = self.registry.fidelity_of(path)?;
        let doc = self.registry.load(path)?;
        if fidelity == Fidelity::Lossy {
            self.record_lossy(path, CodecOperation::Load)?;
        }
        Ok(doc)
    }

    fn save_document(&mut self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        let fidelity = self.registry.fidelity_of(path)?;
        self.registry.save(doc, path)?;
        if fidelity == Fidelity::Lossy {
            self.record_lossy(path, CodecOperation::Save)?;
        }
        Ok(())
    }

    fn record_lossy(&mut self, path: &Path, operation: CodecOperation) -> Result<(), FlexError> {
        // the registry already logged this one
        self.warnings.push(FlexWarning::RoundTripFidelity {
            format: FormatRegistry::check_file_type(path)?,
            path: path.display().to_string(),
            operation,
        });
        Ok(())
    }

    fn record(&mut self, warning: FlexWarning) {
        warn!(%warning, "flex warning");
        self.warnings.push(warning);
    }
}
