use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use flex_core::errors::FlexError;

use super::{ensure_parent, io_error, serde_error, FormatCodec};
use crate::scalar::Scalar;
use crate::table::TabularDocument;

/// Header line followed by one record per row. Missing cells are empty fields.
#[derive(Debug, Clone)]
pub struct CsvCodec {
    delimiter: u8,
}

impl CsvCodec {
    /// `delimiter` must be ascii; see [`CodecOptions::validate`](super::CodecOptions::validate).
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl FormatCodec for CsvCodec {
    fn name(&self) -> &str {
        "csv"
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        ensure_parent(path)?;
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)
            .map_err(|err| io_error("csv-open", path, err))?;
        if doc.num_columns() > 0 {
            writer
                .write_record(doc.columns())
                .map_err(|err| serde_error("csv-write-header", path, err))?;
            for row in doc.cells() {
                writer
                    .write_record(row.iter().map(Scalar::to_text))
                    .map_err(|err| serde_error("csv-write-row", path, err))?;
            }
        }
        writer
            .flush()
            .map_err(|err| io_error("csv-flush", path, err))
    }

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)
            .map_err(|err| io_error("csv-open", path, err))?;
        let columns: Vec<String> = reader
            .headers()
            .map_err(|err| serde_error("csv-header", path, err))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|err| serde_error("csv-record", path, err))?;
            rows.push(record.iter().map(Scalar::parse_text).collect());
        }
        TabularDocument::from_cells(columns, rows)
    }
}
