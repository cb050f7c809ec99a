//! Current configuration plus the run history that mirrors it.

use flex_core::errors::FlexError;
use tracing::debug;

use crate::scalar::Record;
use crate::table::TabularDocument;

/// Holds the current config (one row once set) and the log of every config
/// ever set. After each mutation the log's last row equals the current row.
///
/// The two are kept apart so that merging rows with differing columns never
/// disturbs the authoritative current row or the order of past rows.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: TabularDocument,
    log: TabularDocument,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from prior history and an optional config. A `config`
    /// with no rows leaves the current config unset; otherwise it is appended
    /// after `logs`.
    pub fn with_state(logs: TabularDocument, config: TabularDocument) -> Result<Self, FlexError> {
        let mut store = Self::new();
        if !config.is_empty() {
            store.set_config(config)?;
        }
        store.set_logs(logs);
        Ok(store)
    }

    /// Replaces the current config and appends it to the log.
    pub fn set_config(&mut self, doc: TabularDocument) -> Result<(), FlexError> {
        if doc.len() != 1 {
            return Err(FlexError::shape("config-rows", "1", doc.len()));
        }
        self.log = self.log.concat_rows(&doc);
        self.current = doc;
        debug!(log_rows = self.log.len(), "config replaced");
        self.check();
        Ok(())
    }

    /// Replaces the whole log, then appends the current config again. A
    /// trailing row equal to the current one is kept, not deduplicated.
    pub fn set_logs(&mut self, doc: TabularDocument) {
        self.log = doc.concat_rows(&self.current);
        debug!(log_rows = self.log.len(), "log replaced");
        self.check();
    }

    /// Imports historical rows without touching the current config. The rows
    /// are placed before the trailing row that mirrors the current config.
    pub fn append(&mut self, doc: &TabularDocument) {
        self.log = if self.has_config() {
            self.log
                .without_last_row()
                .concat_rows(doc)
                .concat_rows(&self.current)
        } else {
            self.log.concat_rows(doc)
        };
        debug!(imported = doc.len(), log_rows = self.log.len(), "history appended");
        self.check();
    }

    /// Merges `fields` over the current config and corrects the log's last row to match.
    pub fn edit_config(&mut self, fields: &Record) -> Result<(), FlexError> {
        if !self.has_config() {
            return Err(FlexError::empty("edit-unset-config", "current config"));
        }
        let current = self
            .current
            .concat_columns(&TabularDocument::from_record(fields.clone()))?;
        self.log = self.log.replace_last_row(&current.last_row()?)?;
        self.current = current;
        debug!(fields = fields.len(), "config edited");
        self.check();
        Ok(())
    }

    pub fn current_config(&self) -> Result<Record, FlexError> {
        self.current
            .last_row()
            .map_err(|_| FlexError::empty("current-unset", "current config"))
    }

    /// The current config as a one-row document.
    pub fn current_document(&self) -> Result<&TabularDocument, FlexError> {
        if self.has_config() {
            Ok(&self.current)
        } else {
            Err(FlexError::empty("current-unset", "current config"))
        }
    }

    pub fn logs(&self) -> &TabularDocument {
        &self.log
    }

    pub fn has_config(&self) -> bool {
        !self.current.is_empty()
    }

    /// True when the log ends with the current config, or no config is set.
    pub fn is_consistent(&self) -> bool {
        match (self.current.last_row(), self.log.last_row()) {
            (Ok(current), Ok(last)) => current == last,
            (Err(_), _) => true,
            (Ok(_), Err(_)) => false,
        }
    }

    fn check(&self) {
        debug_assert!(self.is_consistent(), "log out of sync with current config");
    }
}
