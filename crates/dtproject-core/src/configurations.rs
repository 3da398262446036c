use crate::CoreError;
use dtproject_schema::parse_record_str;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Optional file at the project root declaring named run configurations.
pub const CONFIGURATIONS_FILE: &str = "configurations.yaml";

const CONFIGURATIONS_KEY: &str = "configurations";

pub type Configurations = BTreeMap<String, Value>;

/// Parse a configurations file.
///
/// The named configurations are either the whole document or the mapping
/// under its `configurations` key. An empty document has none.
pub fn parse_configurations(path: &Path) -> Result<Configurations, CoreError> {
    let content = std::fs::read_to_string(path)?;
    let mut document: BTreeMap<String, Value> =
        parse_record_str(&content).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    match document.remove(CONFIGURATIONS_KEY) {
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        Some(Value::Null) => Ok(Configurations::new()),
        Some(other) => Err(CoreError::Config(format!(
            "'{CONFIGURATIONS_KEY}' in '{}' must be a mapping, found {other}",
            path.display()
        ))),
        None => Ok(document),
    }
}
