//! The `dtproject/` layers directory used by format version 4 onwards.

use crate::layers::{LayerBase, LayerDistro, LayerRecord, LayerSelf, LayerTemplate, Layers, REQUIRED_LAYERS};
use crate::loader::{load_layer, load_record};
use crate::rules;
use crate::DescriptorError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the layers directory inside a project.
pub const LAYERS_DIR: &str = "dtproject";

const LAYER_EXTENSION: &str = "yaml";

/// Parse `<project>/dtproject/` into a [`Layers`] aggregate.
///
/// The four required layers are loaded first and each must parse and validate
/// on its own; every other `*.yaml` file becomes a custom layer keyed by its
/// stem. Any failure aborts the whole load.
pub fn parse_layers(project: &Path) -> Result<Layers, DescriptorError> {
    let layers_dir = project.join(LAYERS_DIR);
    if !layers_dir.exists() {
        return Err(DescriptorError::NotFound(project.to_path_buf()));
    }
    if !layers_dir.is_dir() {
        return Err(DescriptorError::malformed(&layers_dir, "must be a directory"));
    }

    let self_: LayerSelf = load_layer(&layers_dir)?;
    let template: LayerTemplate = load_layer(&layers_dir)?;
    let distro: LayerDistro = load_layer(&layers_dir)?;
    let base: LayerBase = load_layer(&layers_dir)?;

    let mut custom = BTreeMap::new();
    for path in custom_layer_files(&layers_dir)? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let record: LayerRecord = load_record(&path)?;
        debug!("loaded custom layer '{stem}' from {}", path.display());
        custom.insert(stem.to_owned(), record);
    }

    let layers = Layers {
        self_,
        template,
        distro,
        base,
        custom,
    };
    validate_type_fields(&layers, &layers_dir)?;
    Ok(layers)
}

/// `*.yaml` files in `layers_dir` that are not required layers, sorted by name.
fn custom_layer_files(layers_dir: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
    let entries = fs::read_dir(layers_dir).map_err(|e| DescriptorError::io(layers_dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DescriptorError::io(layers_dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(LAYER_EXTENSION) {
            continue;
        }
        let is_required = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| REQUIRED_LAYERS.contains(&stem));
        if !is_required {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn validate_type_fields(layers: &Layers, layers_dir: &Path) -> Result<(), DescriptorError> {
    let required = rules::layer_fields(&layers.template.name, &layers.template.version);
    for (layer, field) in required {
        if layers.custom_field(layer, field).is_none() {
            return Err(DescriptorError::malformed(
                layers_dir.join(format!("{layer}.{LAYER_EXTENSION}")),
                format!(
                    "projects of type '{}' v{} must declare '{field}' in the '{layer}' layer",
                    layers.template.name, layers.template.version
                ),
            ));
        }
    }
    Ok(())
}
