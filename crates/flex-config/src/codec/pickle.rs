use std::fs;
use std::path::Path;

use flex_core::errors::{ErrorInfo, FlexError};
use flex_core::SchemaVersion;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ensure_parent, io_error, serde_error, FormatCodec};
use crate::scalar::Scalar;
use crate::table::TabularDocument;

const PICKLE_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Tagged cell layout; bincode is not self-describing.
#[derive(Debug, Serialize, Deserialize)]
enum StoredCell {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct PickleBody {
    columns: Vec<String>,
    rows: Vec<Vec<StoredCell>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PickleEnvelope {
    schema_version: SchemaVersion,
    digest: String,
    body: PickleBody,
}

/// Opaque binary snapshot that reproduces the document exactly, cell types included.
#[derive(Debug, Clone, Default)]
pub struct PickleCodec;

impl FormatCodec for PickleCodec {
    fn name(&self) -> &str {
        "pkl"
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        let body = PickleBody {
            columns: doc.columns().map(str::to_string).collect(),
            rows: doc
                .cells()
                .iter()
                .map(|row| row.iter().map(store).collect())
                .collect(),
        };
        let envelope = PickleEnvelope {
            schema_version: PICKLE_SCHEMA,
            digest: body_digest(&body, path)?,
            body,
        };
        let bytes = bincode::serialize(&envelope)
            .map_err(|err| serde_error("pkl-serialize", path, err))?;
        ensure_parent(path)?;
        fs::write(path, bytes).map_err(|err| io_error("pkl-write", path, err))
    }

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let bytes = fs::read(path).map_err(|err| io_error("pkl-read", path, err))?;
        let envelope: PickleEnvelope = bincode::deserialize(&bytes)
            .map_err(|err| serde_error("pkl-deserialize", path, err))?;
        if !PICKLE_SCHEMA.reads(&envelope.schema_version) {
            return Err(FlexError::Serde(
                ErrorInfo::new("pkl-schema", "snapshot written by an incompatible schema")
                    .with_context("path", path.display().to_string())
                    .with_context(
                        "found",
                        format!(
                            "{}.{}.{}",
                            envelope.schema_version.major,
                            envelope.schema_version.minor,
                            envelope.schema_version.patch
                        ),
                    ),
            ));
        }
        if body_digest(&envelope.body, path)? != envelope.digest {
            return Err(FlexError::Serde(
                ErrorInfo::new("pkl-digest-mismatch", "payload digest does not match")
                    .with_context("path", path.display().to_string())
                    .with_hint("the file was modified or truncated after it was written"),
            ));
        }
        let PickleBody { columns, rows } = envelope.body;
        TabularDocument::from_cells(
            columns,
            rows.into_iter()
                .map(|row| row.into_iter().map(restore).collect())
                .collect(),
        )
    }
}

fn body_digest(body: &PickleBody, path: &Path) -> Result<String, FlexError> {
    let bytes = bincode::serialize(body).map_err(|err| serde_error("pkl-digest", path, err))?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

fn store(cell: &Scalar) -> StoredCell {
    match cell {
        Scalar::Missing => StoredCell::Missing,
        Scalar::Bool(value) => StoredCell::Bool(*value),
        Scalar::Int(value) => StoredCell::Int(*value),
        Scalar::Float(value) => StoredCell::Float(*value),
        Scalar::Str(value) => StoredCell::Str(value.clone()),
    }
}

fn restore(cell: StoredCell) -> Scalar {
    match cell {
        StoredCell::Missing => Scalar::Missing,
        StoredCell::Bool(value) => Scalar::Bool(value),
        StoredCell::Int(value) => Scalar::Int(value),
        StoredCell::Float(value) => Scalar::Float(value),
        StoredCell::Str(value) => Scalar::Str(value),
    }
}
