//! The flat `.dtproject` descriptor used by format versions 1 to 3.

use crate::rules;
use crate::DescriptorError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Marker file of a flat-format project.
pub const LEGACY_FILE: &str = ".dtproject";

/// Reserved key holding the resolved project path.
pub const PATH_KEY: &str = "PATH";

/// Validated content of a `.dtproject` file: upper-cased keys to trimmed values.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LegacyMetadata {
    entries: BTreeMap<String, String>,
}

impl LegacyMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn project_type(&self) -> &str {
        self.get("TYPE").unwrap_or_default()
    }

    pub fn type_version(&self) -> &str {
        self.get("TYPE_VERSION").unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.get("VERSION").unwrap_or_default()
    }

    /// Name declared with the optional `NAME` key.
    pub fn declared_name(&self) -> Option<&str> {
        self.get("NAME")
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

/// Parse and validate `<project>/.dtproject`.
///
/// A missing file is `NotFound`; anything else wrong with the file is
/// `Malformed`, except a `TYPE_VERSION` without registered rules, which is
/// `UnsupportedVersion`.
pub fn parse_legacy(project: &Path) -> Result<LegacyMetadata, DescriptorError> {
    let metafile = project.join(LEGACY_FILE);
    if !metafile.exists() {
        return Err(DescriptorError::NotFound(project.to_path_buf()));
    }
    if !metafile.is_file() {
        return Err(DescriptorError::malformed(&metafile, "must be a regular file"));
    }
    let content = fs::read_to_string(&metafile).map_err(|e| DescriptorError::io(&metafile, e))?;
    if content.lines().next().is_none() {
        return Err(DescriptorError::malformed(&metafile, "the metadata file is empty"));
    }

    let mut entries = parse_entries(&content, &metafile)?;
    validate(&entries, &metafile)?;

    entries.insert(PATH_KEY.to_owned(), project.display().to_string());
    debug!(
        "parsed {} (type {:?}, version {:?})",
        metafile.display(),
        entries.get("TYPE"),
        entries.get("TYPE_VERSION")
    );
    Ok(LegacyMetadata { entries })
}

fn parse_entries(content: &str, metafile: &Path) -> Result<BTreeMap<String, String>, DescriptorError> {
    let mut entries = BTreeMap::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DescriptorError::malformed(
                metafile,
                format!("line {} is not a KEY=value pair: '{line}'", idx + 1),
            ));
        };
        entries.insert(key.trim().to_uppercase(), value.trim().to_owned());
    }
    Ok(entries)
}

fn validate(entries: &BTreeMap<String, String>, metafile: &Path) -> Result<(), DescriptorError> {
    require_keys(entries, rules::version_agnostic_keys(), metafile)?;

    let version = entries
        .get("TYPE_VERSION")
        .map(String::as_str)
        .unwrap_or_default();
    let Some(version_keys) = rules::version_keys(version) else {
        return Err(DescriptorError::UnsupportedVersion(version.to_owned()));
    };
    require_keys(entries, version_keys, metafile)?;

    let project_type = entries.get("TYPE").map(String::as_str).unwrap_or_default();
    require_keys(entries, rules::type_keys(project_type, version), metafile)
}

fn require_keys(
    entries: &BTreeMap<String, String>,
    keys: &[&str],
    metafile: &Path,
) -> Result<(), DescriptorError> {
    match keys.iter().find(|key| !entries.contains_key(**key)) {
        Some(missing) => Err(DescriptorError::malformed(
            metafile,
            format!("the metadata file does not contain the key '{missing}'"),
        )),
        None => Ok(()),
    }
}
