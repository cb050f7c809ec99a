use flex_core::errors::FlexError;
use serde::{Deserialize, Serialize};

use crate::scalar::Record;
use crate::table::TabularDocument;

/// Column names belonging to each part of an experiment record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttribGroups {
    #[serde(default)]
    pub meta: Vec<String>,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
}

impl AttribGroups {
    /// Projects `doc` onto each group. Every listed column must exist.
    pub fn split(&self, doc: &TabularDocument) -> Result<ExperimentAttribs, FlexError> {
        Ok(ExperimentAttribs {
            meta: doc.select(&self.meta)?,
            params: doc.select(&self.params)?,
            results: doc.select(&self.results)?,
        })
    }
}

/// A flat experiment record split into metadata, parameters and results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperimentAttribs {
    pub meta: TabularDocument,
    pub params: TabularDocument,
    pub results: TabularDocument,
}

impl ExperimentAttribs {
    pub fn from_records(meta: Record, params: Record, results: Record) -> Self {
        Self {
            meta: TabularDocument::from_record(meta),
            params: TabularDocument::from_record(params),
            results: TabularDocument::from_record(results),
        }
    }

    /// Joins the three groups column-wise back into one flat document.
    pub fn merge(&self) -> Result<TabularDocument, FlexError> {
        self.meta
            .concat_columns(&self.params)?
            .concat_columns(&self.results)
    }
}
