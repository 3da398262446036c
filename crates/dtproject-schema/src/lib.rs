//! Descriptor parsing and validation for dtproject.
//!
//! This crate defines the schema layer: the generic YAML record loader
//! (`load_record`, `load_layer`), the flat key=value descriptor used by format
//! versions 1 to 3 (`LegacyMetadata`), the `dtproject/` layers directory used
//! by version 4 onwards (`Layers`), and the static required-field tables both
//! parsers consult.

pub mod descriptor;
pub mod layered;
pub mod layers;
pub mod legacy;
pub mod loader;
pub mod rules;

pub use descriptor::{Descriptor, Field};
pub use layered::{parse_layers, LAYERS_DIR};
pub use layers::{
    LayerBase, LayerDistro, LayerRecord, LayerSelf, LayerTemplate, Layers, Maintainer,
    REQUIRED_LAYERS,
};
pub use legacy::{parse_legacy, LegacyMetadata, LEGACY_FILE, PATH_KEY};
pub use loader::{load_layer, load_record, parse_record_str, Layer};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("the path '{0}' does not appear to be a project")]
    NotFound(PathBuf),
    #[error("malformed project descriptor '{path}': {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error("the project version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("field '{field}' not implemented in project format v{version}")]
    NotImplemented { field: &'static str, version: String },
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DescriptorError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// No descriptor marker exists at the probed location.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// A descriptor exists but is structurally invalid.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::Parse { .. })
    }

    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion(_))
    }
}
