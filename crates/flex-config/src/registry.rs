use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use flex_core::errors::{ErrorInfo, FlexError};
use tracing::{debug, warn};

use crate::codec::{
    CodecOptions, CsvCodec, Fidelity, FormatCodec, HtmlCodec, JsonCodec, PickleCodec, YamlCodec,
};
use crate::table::TabularDocument;

/// Explicit file-extension to codec table.
pub struct FormatRegistry {
    codecs: BTreeMap<String, Box<dyn FormatCodec>>,
}

impl FormatRegistry {
    /// Registry with the built-in codecs under `csv`, `json`, `html`, `pkl`, `yml` and `yaml`.
    pub fn new() -> Self {
        Self::populate(&CodecOptions::default())
    }

    pub fn with_options(options: &CodecOptions) -> Result<Self, FlexError> {
        options.validate()?;
        Ok(Self::populate(options))
    }

    /// Registry with no codecs at all.
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    fn populate(options: &CodecOptions) -> Self {
        let mut registry = Self::empty();
        registry.register("csv", CsvCodec::new(options.csv_delimiter as u8));
        registry.register("json", JsonCodec::new(options.json_pretty));
        registry.register("html", HtmlCodec::new(options.html_title.clone()));
        registry.register("pkl", PickleCodec);
        registry.register("yml", YamlCodec);
        registry.register("yaml", YamlCodec);
        registry
    }

    /// Adds or replaces the codec for `key`, returning the previous one.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        codec: impl FormatCodec + 'static,
    ) -> Option<Box<dyn FormatCodec>> {
        self.codecs.insert(key.into(), Box::new(codec))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Format key of `path`: the case-sensitive suffix after the last `.` of the file name.
    pub fn check_file_type(path: &Path) -> Result<String, FlexError> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                FlexError::UnsupportedFormat(
                    ErrorInfo::new("missing-extension", "file name has no extension")
                        .with_context("path", path.display().to_string()),
                )
            })
    }

    pub fn codec_for(&self, path: &Path) -> Result<&dyn FormatCodec, FlexError> {
        let key = Self::check_file_type(path)?;
        self.codecs
            .get(&key)
            .map(|codec| &**codec)
            .ok_or_else(|| {
                FlexError::UnsupportedFormat(
                    ErrorInfo::new("unregistered-extension", "no codec registered for extension")
                        .with_context("extension", key)
                        .with_context("path", path.display().to_string())
                        .with_hint(format!(
                            "registered: {}",
                            self.keys().collect::<Vec<_>>().join(", ")
                        )),
                )
            })
    }

    pub fn fidelity_of(&self, path: &Path) -> Result<Fidelity, FlexError> {
        Ok(self.codec_for(path)?.fidelity())
    }

    pub fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        let codec = self.codec_for(path)?;
        debug!(codec = codec.name(), path = %path.display(), rows = doc.len(), "saving document");
        if codec.fidelity() == Fidelity::Lossy {
            warn!(codec = codec.name(), path = %path.display(), "saving with a lossy codec");
        }
        codec.save(doc, path)
    }

    pub fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let codec = self.codec_for(path)?;
        if codec.fidelity() == Fidelity::Lossy {
            warn!(codec = codec.name(), path = %path.display(), "loading with a lossy codec");
        }
        let doc = codec.load(path)?;
        debug!(codec = codec.name(), path = %path.display(), rows = doc.len(), "loaded document");
        Ok(doc)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
