//! The CI metadata document published next to built images.

use crate::configurations::Configurations;
use crate::image::ImageSpec;
use crate::project::Project;
use crate::selector::Adapter;
use crate::CoreError;
use dtproject_runtime::{ContainerClient, ImageInspection};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const CI_METADATA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CiMetadata {
    pub version: String,
    pub tag: String,
    pub image: ImageInspection,
    pub project: CiProjectInfo,
    pub configurations: Configurations,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CiProjectInfo {
    pub path: PathBuf,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub type_version: String,
    pub distro: String,
    pub version: String,
    pub head_version: String,
    pub closest_version: String,
    pub version_name: String,
    pub url: Option<String>,
    pub sha: String,
    pub adapters: Vec<Adapter>,
    pub is_release: bool,
    pub is_clean: bool,
    pub is_dirty: bool,
    pub is_detached: bool,
}

impl CiProjectInfo {
    pub fn from_project(project: &Project) -> Self {
        Self {
            path: project.path().to_path_buf(),
            name: project.name(),
            project_type: project.project_type().to_owned(),
            type_version: project.type_version().to_owned(),
            distro: project.distro(),
            version: project.version().to_owned(),
            head_version: project.head_version().to_owned(),
            closest_version: project.closest_version().to_owned(),
            version_name: project.version_name().to_owned(),
            url: project.url().map(str::to_owned),
            sha: project.sha().to_owned(),
            adapters: project.adapters().to_vec(),
            is_release: project.is_release(),
            is_clean: project.is_clean(),
            is_dirty: project.is_dirty(),
            is_detached: project.is_detached(),
        }
    }
}

impl CiMetadata {
    /// Inspect the image built for `spec` and bundle it with the project identity.
    ///
    /// Projects without configuration support report an empty mapping.
    pub fn collect(
        project: &Project,
        container: &dyn ContainerClient,
        spec: &ImageSpec,
    ) -> Result<Self, CoreError> {
        let tag = project.image(spec)?;
        let configurations = match project.configurations() {
            Ok(configurations) => configurations,
            Err(e) if e.is_not_implemented() => Configurations::new(),
            Err(e) => return Err(e),
        };
        let image = project.image_metadata(container, spec)?;
        let labels = image.labels();
        Ok(Self {
            version: CI_METADATA_VERSION.to_owned(),
            tag,
            image,
            project: CiProjectInfo::from_project(project),
            configurations,
            labels,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Project {
    pub fn ci_metadata(
        &self,
        container: &dyn ContainerClient,
        spec: &ImageSpec,
    ) -> Result<CiMetadata, CoreError> {
        CiMetadata::collect(self, container, spec)
    }
}
