use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use flex_core::errors::FlexError;
use serde_json::{Map, Value};

use super::{ensure_parent, io_error, serde_error, FormatCodec};
use crate::scalar::Record;
use crate::table::TabularDocument;

/// Array of row objects, each carrying every column (`null` for missing cells).
///
/// Loading also accepts a single flat object (one row) and the column-major
/// `{"column": {"row": value}}` layout written by dataframe tools.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FormatCodec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        ensure_parent(path)?;
        let file = File::create(path).map_err(|err| io_error("json-open", path, err))?;
        let mut writer = BufWriter::new(file);
        let records: Vec<Record> = doc.rows().collect();
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &records)
        } else {
            serde_json::to_writer(&mut writer, &records)
        }
        .map_err(|err| serde_error("json-serialize", path, err))?;
        writer
            .flush()
            .map_err(|err| io_error("json-flush", path, err))
    }

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let bytes = fs::read(path).map_err(|err| io_error("json-open", path, err))?;
        match bytes.iter().find(|byte| !byte.is_ascii_whitespace()) {
            Some(b'[') => {
                let records: Vec<Record> = serde_json::from_slice(&bytes)
                    .map_err(|err| serde_error("json-records", path, err))?;
                Ok(TabularDocument::from_rows(records))
            }
            Some(b'{') => match serde_json::from_slice::<Record>(&bytes) {
                Ok(record) => Ok(TabularDocument::from_record(record)),
                Err(_) => {
                    let value: Value = serde_json::from_slice(&bytes)
                        .map_err(|err| serde_error("json-deserialize", path, err))?;
                    match value {
                        Value::Object(map) if map.values().all(Value::is_object) => {
                            column_major(map, path)
                        }
                        _ => Err(serde_error(
                            "json-layout",
                            path,
                            "object values must all be scalars or all be column objects",
                        )),
                    }
                }
            },
            _ => {
                let value: Value = serde_json::from_slice(&bytes)
                    .map_err(|err| serde_error("json-deserialize", path, err))?;
                Err(serde_error(
                    "json-layout",
                    path,
                    format!("expected an array or object, found {}", kind_of(&value)),
                ))
            }
        }
    }
}

fn column_major(map: Map<String, Value>, path: &Path) -> Result<TabularDocument, FlexError> {
    let mut index: Vec<String> = Vec::new();
    for cells in map.values().filter_map(Value::as_object) {
        for key in cells.keys() {
            if !index.contains(key) {
                index.push(key.clone());
            }
        }
    }
    if index.iter().all(|key| key.parse::<u64>().is_ok()) {
        index.sort_by_key(|key| key.parse::<u64>().unwrap_or(u64::MAX));
    }
    let mut rows = Vec::with_capacity(index.len());
    for key in &index {
        let row: Map<String, Value> = map
            .iter()
            .map(|(column, cells)| {
                let cell = cells.get(key.as_str()).cloned().unwrap_or(Value::Null);
                (column.clone(), cell)
            })
            .collect();
        let record: Record = serde_json::from_value(Value::Object(row))
            .map_err(|err| serde_error("json-columns", path, err))?;
        rows.push(record);
    }
    Ok(TabularDocument::from_rows(rows))
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
