//! Resolution engine for versioned project descriptors.
//!
//! This crate ties together descriptor parsing, the external collaborators,
//! and the static template tables into the `Project` facade: format
//! selection over a directory (`resolve`), path mapping for code, launch
//! files, assets and docs (`PathResolver`), recipe resolution
//! (`RecipeCache`), deterministic image naming (`ImageSpec`), and the CI
//! metadata document.

pub mod ci;
pub mod config;
pub mod configurations;
pub mod image;
pub mod mapping;
pub mod paths;
pub mod project;
pub mod recipe;
pub mod selector;

pub use ci::{CiMetadata, CiProjectInfo, CI_METADATA_VERSION};
pub use config::Settings;
pub use configurations::{parse_configurations, Configurations, CONFIGURATIONS_FILE};
pub use image::{assert_canonical_arch, canonical_arch, sanitize_version, ImageSpec, CANONICAL_ARCHS};
pub use mapping::ArtifactKind;
pub use paths::{PathMapping, PathResolver};
pub use project::{Project, ProjectLoader};
pub use recipe::{RecipeCache, RecipeRef};
pub use selector::{resolve, Adapter, ProjectDescriptor, ResolvedProject};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Descriptor(#[from] dtproject_schema::DescriptorError),
    #[error("runtime error: {0}")]
    Runtime(#[from] dtproject_runtime::RuntimeError),
    #[error("remote error: {0}")]
    Remote(#[from] dtproject_remote::RemoteError),
    #[error("template {project_type} v{version} is not supported for {kind}")]
    UnsupportedTemplate {
        project_type: String,
        version: String,
        kind: ArtifactKind,
    },
    #[error("recipe project not found: {0}")]
    RecipeNotFound(String),
    #[error("{0}")]
    Usage(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// No recognizable descriptor at the given path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Descriptor(e) if e.is_not_found())
    }

    /// A descriptor was found but is invalid or declares an unsupported version.
    pub fn is_invalid_descriptor(&self) -> bool {
        matches!(self, Self::Descriptor(e) if e.is_malformed() || e.is_unsupported_version())
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            Self::Descriptor(dtproject_schema::DescriptorError::NotImplemented { .. })
        )
    }
}
