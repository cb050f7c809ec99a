use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flex_core::errors::FlexError;

use super::{ensure_parent, io_error, serde_error, FormatCodec};
use crate::scalar::Record;
use crate::table::TabularDocument;

/// One row as a flat key/value mapping. Multi-row documents cannot be saved and
/// multi-document files cannot be loaded.
#[derive(Debug, Clone, Default)]
pub struct YamlCodec;

impl FormatCodec for YamlCodec {
    fn name(&self) -> &str {
        "yaml"
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        let record = doc.to_mapping()?;
        ensure_parent(path)?;
        let file = File::create(path).map_err(|err| io_error("yaml-open", path, err))?;
        let mut writer = BufWriter::new(file);
        serde_yaml::to_writer(&mut writer, &record)
            .map_err(|err| serde_error("yaml-serialize", path, err))?;
        writer
            .flush()
            .map_err(|err| io_error("yaml-flush", path, err))
    }

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let file = File::open(path).map_err(|err| io_error("yaml-open", path, err))?;
        let record: Record = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| serde_error("yaml-deserialize", path, err))?;
        Ok(TabularDocument::from_record(record))
    }
}
