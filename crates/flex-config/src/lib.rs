//! Configuration and run-history store for iterative experiment workflows.
//!
//! A [`Configuration`] keeps the current run's config next to a log of every
//! config set so far, and persists either through the codec picked by the
//! file extension (`csv`, `json`, `yml`/`yaml`, `pkl`, `html`).

mod attribs;
pub mod codec;
mod configuration;
mod registry;
mod scalar;
mod store;
mod table;

pub use attribs::{AttribGroups, ExperimentAttribs};
pub use codec::{CodecOptions, Fidelity, FormatCodec};
pub use configuration::{ConfigInput, Configuration, CONFIG_FILE_FIELD};
pub use registry::FormatRegistry;
pub use scalar::{Record, Scalar, TEXT_QUOTE};
pub use store::ConfigStore;
pub use table::TabularDocument;

pub use flex_core::{CodecOperation, ErrorInfo, FlexError, FlexWarning, InputTarget};
