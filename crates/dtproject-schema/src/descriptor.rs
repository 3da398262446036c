//! Uniform read access over both descriptor formats.
//!
//! Each format declares which optional fields it can express; asking a format
//! for a field outside its capability set yields
//! [`DescriptorError::NotImplemented`] rather than a panic.

use crate::layers::Layers;
use crate::legacy::LegacyMetadata;
use crate::DescriptorError;
use std::collections::BTreeMap;

/// Fields that not every descriptor format can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Description,
    Maintainer,
    Icon,
    Layers,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::Maintainer => "maintainer",
            Field::Icon => "icon",
            Field::Layers => "layers",
        }
    }
}

pub trait Descriptor {
    /// Optional fields this format supports.
    fn capabilities(&self) -> &'static [Field];

    fn project_type(&self) -> &str;

    fn type_version(&self) -> &str;

    fn version(&self) -> &str;

    /// Name written in the descriptor itself, if any.
    fn declared_name(&self) -> Option<&str>;

    /// Flat `KEY -> value` view; always includes `VERSION`, `TYPE` and `TYPE_VERSION`.
    fn metadata(&self) -> BTreeMap<String, String>;

    fn description(&self) -> Result<&str, DescriptorError> {
        Err(self.not_implemented(Field::Description))
    }

    fn maintainer(&self) -> Result<String, DescriptorError> {
        Err(self.not_implemented(Field::Maintainer))
    }

    fn icon(&self) -> Result<&str, DescriptorError> {
        Err(self.not_implemented(Field::Icon))
    }

    fn layers(&self) -> Result<&Layers, DescriptorError> {
        Err(self.not_implemented(Field::Layers))
    }

    fn supports(&self, field: Field) -> bool {
        self.capabilities().contains(&field)
    }

    fn not_implemented(&self, field: Field) -> DescriptorError {
        DescriptorError::NotImplemented {
            field: field.as_str(),
            version: self.type_version().to_owned(),
        }
    }
}

impl Descriptor for LegacyMetadata {
    fn capabilities(&self) -> &'static [Field] {
        &[]
    }

    fn project_type(&self) -> &str {
        LegacyMetadata::project_type(self)
    }

    fn type_version(&self) -> &str {
        LegacyMetadata::type_version(self)
    }

    fn version(&self) -> &str {
        LegacyMetadata::version(self)
    }

    fn declared_name(&self) -> Option<&str> {
        LegacyMetadata::declared_name(self)
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        self.entries().clone()
    }
}

/// Layered descriptors do not know their own path; callers add `PATH`.
impl Descriptor for Layers {
    fn capabilities(&self) -> &'static [Field] {
        &[
            Field::Description,
            Field::Maintainer,
            Field::Icon,
            Field::Layers,
        ]
    }

    fn project_type(&self) -> &str {
        &self.template.name
    }

    fn type_version(&self) -> &str {
        &self.template.version
    }

    fn version(&self) -> &str {
        &self.self_.version
    }

    fn declared_name(&self) -> Option<&str> {
        Some(self.self_.name.as_str()).filter(|n| !n.is_empty())
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("VERSION".to_owned(), self.self_.version.clone()),
            ("TYPE".to_owned(), self.template.name.clone()),
            ("TYPE_VERSION".to_owned(), self.template.version.clone()),
        ])
    }

    fn description(&self) -> Result<&str, DescriptorError> {
        Ok(&self.self_.description)
    }

    fn maintainer(&self) -> Result<String, DescriptorError> {
        Ok(self.self_.maintainer.to_string())
    }

    fn icon(&self) -> Result<&str, DescriptorError> {
        Ok(&self.self_.icon)
    }

    fn layers(&self) -> Result<&Layers, DescriptorError> {
        Ok(self)
    }
}
