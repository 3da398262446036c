use crate::loader::{opt_scalar_string, scalar_string, Layer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form key/value content of a custom layer.
pub type LayerRecord = BTreeMap<String, serde_yml::Value>;

/// Layers every v4+ project must carry, in load order.
pub const REQUIRED_LAYERS: [&str; 4] = ["self", "template", "distro", "base"];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Maintainer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
}

impl fmt::Display for Maintainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.organization {
            Some(org) => write!(f, "{} @ {} ({})", self.name, org, self.email),
            None => write!(f, "{} ({})", self.name, self.email),
        }
    }
}

/// Identity and authoring metadata (`self.yaml`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LayerSelf {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    pub maintainer: Maintainer,
    pub description: String,
    pub icon: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
}

impl Layer for LayerSelf {
    const NAME: &'static str = "self";

    fn validate(&self) -> Result<(), String> {
        if self.maintainer.email.trim().is_empty() {
            return Err("maintainer.email must not be empty".to_owned());
        }
        Ok(())
    }
}

/// Template declaration (`template.yaml`): selects mapping and rule tables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LayerTemplate {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

fn default_provider() -> String {
    "github.com".to_owned()
}

impl Layer for LayerTemplate {
    const NAME: &'static str = "template";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("template name must not be empty".to_owned());
        }
        if self.version.trim().is_empty() {
            return Err("template version must not be empty".to_owned());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LayerDistro {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
}

impl Layer for LayerDistro {
    const NAME: &'static str = "distro";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("distro name must not be empty".to_owned());
        }
        Ok(())
    }
}

/// Base image reference (`base.yaml`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LayerBase {
    pub repository: String,
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar_string")]
    pub tag: Option<String>,
}

impl Layer for LayerBase {
    const NAME: &'static str = "base";

    fn validate(&self) -> Result<(), String> {
        if self.repository.trim().is_empty() {
            return Err("base repository must not be empty".to_owned());
        }
        Ok(())
    }
}

/// The full layer set of a v4+ project: four fixed layers plus any custom
/// layers found next to them, keyed by file stem.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layers {
    #[serde(rename = "self")]
    pub self_: LayerSelf,
    pub template: LayerTemplate,
    pub distro: LayerDistro,
    pub base: LayerBase,
    #[serde(flatten)]
    pub custom: BTreeMap<String, LayerRecord>,
}

impl Layers {
    pub fn custom_layer(&self, name: &str) -> Option<&LayerRecord> {
        self.custom.get(name)
    }

    /// String value of `key` inside custom layer `layer`, if it is a scalar.
    pub fn custom_field(&self, layer: &str, key: &str) -> Option<String> {
        match self.custom.get(layer)?.get(key)? {
            serde_yml::Value::String(s) => Some(s.clone()),
            serde_yml::Value::Number(n) => Some(n.to_string()),
            serde_yml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Names of all layers, required first, then custom layers in order.
    pub fn names(&self) -> Vec<&str> {
        REQUIRED_LAYERS
            .iter()
            .copied()
            .chain(self.custom.keys().map(String::as_str))
            .collect()
    }
}
