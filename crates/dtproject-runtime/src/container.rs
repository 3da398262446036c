use crate::process::run;
use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Inspection metadata of a local image, as reported by the container runtime.
///
/// Deserializes from the runtime's PascalCase JSON and serializes back in
/// snake_case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(deserialize = "PascalCase"))]
pub struct ImageInspection {
    pub id: String,
    #[serde(default)]
    pub repo_tags: Vec<String>,
    #[serde(default)]
    pub repo_digests: Vec<String>,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub docker_version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub config: ImageConfig,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename(deserialize = "RootFS"))]
    pub root_fs: RootFs,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all(deserialize = "PascalCase"))]
pub struct ImageConfig {
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub env: Option<Vec<String>>,
    #[serde(default)]
    pub entrypoint: Option<Vec<String>>,
    #[serde(default)]
    pub cmd: Option<Vec<String>>,
    #[serde(default)]
    pub working_dir: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootFs {
    #[serde(default, rename(deserialize = "Type"))]
    pub kind: String,
    #[serde(default, rename(deserialize = "Layers"))]
    pub layers: Vec<String>,
}

impl ImageInspection {
    pub fn labels(&self) -> BTreeMap<String, String> {
        self.config.labels.clone().unwrap_or_default()
    }
}

pub trait ContainerClient: Send + Sync {
    fn name(&self) -> &str;

    /// Inspect a local image; fails with [`RuntimeError::NoSuchImage`] if it is absent.
    fn inspect_image(&self, reference: &str) -> Result<ImageInspection, RuntimeError>;
}

/// [`ContainerClient`] backed by the `docker` command line.
pub struct DockerCli {
    program: String,
    host: Option<String>,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            program: "docker".to_owned(),
            host: None,
        }
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to the daemon at `host` (passed as `-H`).
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl ContainerClient for DockerCli {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn inspect_image(&self, reference: &str) -> Result<ImageInspection, RuntimeError> {
        let mut args: Vec<&str> = Vec::new();
        if let Some(host) = &self.host {
            args.extend(["-H", host.as_str()]);
        }
        args.extend(["image", "inspect", reference]);
        debug!("inspecting image {reference}");

        let out = run(&self.program, &args)?;
        if !out.success() {
            if out.stderr.contains("No such image") {
                return Err(RuntimeError::NoSuchImage(reference.to_owned()));
            }
            return Err(out.into_failure());
        }
        parse_inspect_output(&out.stdout, &out.command)?
            .ok_or_else(|| RuntimeError::NoSuchImage(reference.to_owned()))
    }
}

/// Parse the JSON array printed by `image inspect`, returning its first entry.
pub fn parse_inspect_output(
    stdout: &str,
    command: &str,
) -> Result<Option<ImageInspection>, RuntimeError> {
    let images: Vec<ImageInspection> =
        serde_json::from_str(stdout).map_err(|e| RuntimeError::InvalidOutput {
            command: command.to_owned(),
            reason: e.to_string(),
        })?;
    Ok(images.into_iter().next())
}
