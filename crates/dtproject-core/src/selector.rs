//! Format selection: decide which descriptor format a directory uses.

use crate::paths::normalize_path;
use crate::CoreError;
use dtproject_runtime::{RepositoryInfo, VcsClient};
use dtproject_schema::{parse_layers, parse_legacy, Descriptor, DescriptorError, LegacyMetadata, Layers};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Working-copy marker of a git repository.
pub const GIT_DIR: &str = ".git";

/// Capability tags of a resolved project, in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Adapter {
    #[serde(rename = "fs")]
    Filesystem,
    #[serde(rename = "git")]
    Git,
    #[serde(rename = "dtproject")]
    Dtproject,
}

impl Adapter {
    pub fn as_str(self) -> &'static str {
        match self {
            Adapter::Filesystem => "fs",
            Adapter::Git => "git",
            Adapter::Dtproject => "dtproject",
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The descriptor a project committed to.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectDescriptor {
    Legacy(LegacyMetadata),
    Layered(Layers),
}

impl ProjectDescriptor {
    pub fn as_descriptor(&self) -> &dyn Descriptor {
        match self {
            ProjectDescriptor::Legacy(meta) => meta,
            ProjectDescriptor::Layered(layers) => layers,
        }
    }

    pub fn format(&self) -> &'static str {
        match self {
            ProjectDescriptor::Legacy(_) => "legacy",
            ProjectDescriptor::Layered(_) => "layered",
        }
    }
}

type Candidate = (&'static str, fn(&Path) -> Result<ProjectDescriptor, DescriptorError>);

/// Candidate formats, in priority order.
static CANDIDATES: &[Candidate] = &[
    ("legacy", |path| parse_legacy(path).map(ProjectDescriptor::Legacy)),
    ("layered", |path| parse_layers(path).map(ProjectDescriptor::Layered)),
];

/// A project directory bound to exactly one descriptor format.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProject {
    pub path: PathBuf,
    pub descriptor: ProjectDescriptor,
    pub repository: Option<RepositoryInfo>,
    pub adapters: Vec<Adapter>,
}

/// Resolve the descriptor of the project at `path`.
///
/// Candidates are tried in order and the first one that validates wins.
/// If none does, the error of a candidate whose descriptor was present but
/// invalid is reported; otherwise the project is not found.
pub fn resolve(path: &Path, vcs: &dyn VcsClient) -> Result<ResolvedProject, CoreError> {
    let path = normalize_path(path)?;
    if !path.exists() {
        return Err(DescriptorError::NotFound(path).into());
    }

    let mut rejected: Option<DescriptorError> = None;
    let mut descriptor = None;
    for (format, parse) in CANDIDATES {
        match parse(&path) {
            Ok(d) => {
                debug!("{} matches the {format} format", path.display());
                descriptor = Some(d);
                break;
            }
            Err(e) => {
                debug!("{} is not a {format} project: {e}", path.display());
                if rejected.is_none() && !e.is_not_found() {
                    rejected = Some(e);
                }
            }
        }
    }
    let Some(descriptor) = descriptor else {
        return Err(rejected.unwrap_or(DescriptorError::NotFound(path)).into());
    };

    let mut adapters = vec![Adapter::Filesystem];
    let repository = if path.join(GIT_DIR).is_dir() {
        debug!("reading repository state with {}", vcs.name());
        let info = vcs.repository_info(&path)?;
        adapters.push(Adapter::Git);
        Some(info)
    } else {
        None
    };
    adapters.push(Adapter::Dtproject);

    let d = descriptor.as_descriptor();
    info!(
        "resolved {} as {} v{} ({})",
        path.display(),
        d.project_type(),
        d.type_version(),
        descriptor.format()
    );
    Ok(ResolvedProject {
        path,
        descriptor,
        repository,
        adapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtproject_runtime::mock::MockVcs;
    use std::fs;

    fn write_layers(dir: &Path) {
        let layers = dir.join("dtproject");
        fs::create_dir_all(&layers).unwrap();
        fs::write(
            layers.join("self.yaml"),
            "name: layered\nmaintainer:\n  name: Ada\n  email: ada@example.com\ndescription: d\nicon: cube\nversion: 1.0.0\n",
        )
        .unwrap();
        fs::write(layers.join("template.yaml"), "name: template-basic\nversion: 4\n").unwrap();
        fs::write(layers.join("distro.yaml"), "name: ente\n").unwrap();
        fs::write(layers.join("base.yaml"), "repository: base\n").unwrap();
    }

    #[test]
    fn legacy_wins_when_both_formats_are_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".dtproject"),
            "TYPE=template-ros\nTYPE_VERSION=2\nVERSION=0.1\n",
        )
        .unwrap();
        write_layers(dir.path());
        let vcs = MockVcs::clean("repo", "ente");
        for _ in 0..3 {
            let project = resolve(dir.path(), &vcs).unwrap();
            assert_eq!(project.descriptor.format(), "legacy");
        }
    }

    #[test]
    fn layered_used_when_legacy_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        write_layers(dir.path());
        let project = resolve(dir.path(), &MockVcs::clean("repo", "ente")).unwrap();
        assert_eq!(project.descriptor.format(), "layered");
        assert_eq!(project.adapters, vec![Adapter::Filesystem, Adapter::Dtproject]);
        assert!(project.repository.is_none());
    }

    #[test]
    fn git_marker_enables_repository_identity() {
        let dir = tempfile::tempdir().unwrap();
        write_layers(dir.path());
        fs::create_dir(dir.path().join(".git")).unwrap();
        let project = resolve(dir.path(), &MockVcs::clean("repo", "ente")).unwrap();
        assert_eq!(
            project.adapters,
            vec![Adapter::Filesystem, Adapter::Git, Adapter::Dtproject]
        );
        assert_eq!(project.repository.unwrap().branch, "ente");
    }

    #[test]
    fn empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(dir.path(), &MockVcs::clean("r", "b")).unwrap_err();
        assert!(err.is_not_found());
        let err = resolve(&dir.path().join("missing"), &MockVcs::clean("r", "b")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_descriptor_is_reported_over_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".dtproject"), "TYPE_VERSION=*\n").unwrap();
        let err = resolve(dir.path(), &MockVcs::clean("r", "b")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Descriptor(DescriptorError::UnsupportedVersion(_))
        ));

        fs::write(dir.path().join(".dtproject"), "TYPE_VERSION=2\n").unwrap();
        let err = resolve(dir.path(), &MockVcs::clean("r", "b")).unwrap_err();
        assert!(err.is_invalid_descriptor());
        assert!(!err.is_not_found());
    }
}
