//! Generic YAML-to-record decoding shared by every layer parser.

use crate::layers::LayerRecord;
use crate::DescriptorError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

/// A typed layer stored as `<NAME>.yaml` inside the layers directory.
pub trait Layer: DeserializeOwned {
    const NAME: &'static str;

    /// Field-level checks that deserialization alone cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Parse a YAML document into a record, treating an empty or null document
/// as the record's default value.
pub fn parse_record_str<T: DeserializeOwned + Default>(input: &str) -> Result<T, serde_yml::Error> {
    if is_blank_document(input) {
        return Ok(T::default());
    }
    let parsed: Option<T> = serde_yml::from_str(input)?;
    Ok(parsed.unwrap_or_default())
}

/// Load a free-form key/value record from a YAML file.
pub fn load_record(path: &Path) -> Result<LayerRecord, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|e| DescriptorError::io(path, e))?;
    parse_record_str(&content).map_err(|source| DescriptorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate the required layer `L` from `layers_dir`.
pub fn load_layer<L: Layer>(layers_dir: &Path) -> Result<L, DescriptorError> {
    let path = layers_dir.join(format!("{}.yaml", L::NAME));
    if !path.is_file() {
        return Err(DescriptorError::malformed(
            &path,
            format!("the required layer file '{}.yaml' is missing", L::NAME),
        ));
    }
    let content = fs::read_to_string(&path).map_err(|e| DescriptorError::io(&path, e))?;
    let layer: L = serde_yml::from_str(&content).map_err(|source| DescriptorError::Parse {
        path: path.clone(),
        source,
    })?;
    layer
        .validate()
        .map_err(|reason| DescriptorError::malformed(&path, reason))?;
    Ok(layer)
}

fn is_blank_document(input: &str) -> bool {
    input
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Accept any YAML scalar where a string is expected, so that `version: 4`
/// and `version: "4"` read the same.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

pub(crate) fn opt_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}
