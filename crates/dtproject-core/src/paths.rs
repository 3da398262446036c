use crate::mapping::{self, ArtifactKind, MappingEntry};
use crate::CoreError;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A host path and the location it is mounted at inside the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathMapping {
    pub local: PathBuf,
    pub destination: String,
}

/// Applies the template tables to one project.
///
/// `path` must be the real project directory; `root` arguments only change
/// the prefix of the returned local paths (e.g. a remote mount point).
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    path: &'a Path,
    name: &'a str,
    project_type: &'a str,
    type_version: &'a str,
}

impl<'a> PathResolver<'a> {
    pub fn new(path: &'a Path, name: &'a str, project_type: &'a str, type_version: &'a str) -> Self {
        Self {
            path,
            name,
            project_type,
            type_version,
        }
    }

    pub fn code_paths(&self, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        self.resolve(ArtifactKind::Code, root)
    }

    /// Launch mappings never expand; there is always exactly one pair.
    pub fn launch_paths(&self, root: Option<&Path>) -> Result<PathMapping, CoreError> {
        let entry = self.entry(ArtifactKind::Launch)?;
        let (local, destination) = entry.apply(self.name);
        Ok(PathMapping {
            local: join_local(&effective_root(self.path, root)?, &local),
            destination,
        })
    }

    pub fn assets_paths(&self, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        self.resolve(ArtifactKind::Assets, root)
    }

    pub fn docs_path(&self) -> Result<PathBuf, CoreError> {
        mapping::docs_entry(self.project_type, self.type_version)
            .map(|dir| self.path.join(dir))
            .ok_or_else(|| self.unsupported(ArtifactKind::Docs))
    }

    /// Mappings for `kind`; docs and launch are folded into the list form.
    pub fn paths(&self, kind: ArtifactKind, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        match kind {
            ArtifactKind::Code | ArtifactKind::Assets => self.resolve(kind, root),
            ArtifactKind::Launch => Ok(vec![self.launch_paths(root)?]),
            ArtifactKind::Docs => Ok(vec![PathMapping {
                local: self.docs_path()?,
                destination: String::new(),
            }]),
        }
    }

    fn entry(&self, kind: ArtifactKind) -> Result<MappingEntry, CoreError> {
        mapping::lookup(kind, self.project_type, self.type_version)
            .ok_or_else(|| self.unsupported(kind))
    }

    fn unsupported(&self, kind: ArtifactKind) -> CoreError {
        CoreError::UnsupportedTemplate {
            project_type: self.project_type.to_owned(),
            version: self.type_version.to_owned(),
            kind,
        }
    }

    fn resolve(&self, kind: ArtifactKind, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        let entry = self.entry(kind)?;
        let root = effective_root(self.path, root)?;
        let (local, destination) = entry.apply(self.name);

        if !entry.is_pattern() {
            return Ok(vec![PathMapping {
                local: join_local(&root, &local),
                destination,
            }]);
        }

        // patterns are matched against the real project, then re-rooted
        let base = self.path.to_str().ok_or_else(|| {
            CoreError::Usage(format!(
                "project path '{}' is not valid UTF-8",
                self.path.display()
            ))
        })?;
        let pattern = format!("{}/{local}", glob::Pattern::escape(base.trim_end_matches('/')));
        debug!("expanding {kind} pattern {pattern}");

        // `*` never matches hidden entries
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..glob::MatchOptions::new()
        };
        let matches = glob::glob_with(&pattern, options)
            .map_err(|e| CoreError::Usage(format!("invalid pattern '{pattern}': {e}")))?;
        let mut mappings = Vec::new();
        for matched in matches {
            let matched = matched.map_err(glob::GlobError::into_error)?;
            if !matched.is_dir() {
                continue;
            }
            let Ok(relative) = matched.strip_prefix(self.path) else {
                continue;
            };
            let Some(segment) = matched.file_name() else {
                continue;
            };
            mappings.push(PathMapping {
                local: root.join(relative),
                destination: join_destination(&destination, &segment.to_string_lossy()),
            });
        }
        Ok(mappings)
    }
}

/// Absolute form of `path` with `.` and `..` folded away lexically and no
/// trailing separator. Symlinks are not followed.
pub fn normalize_path(path: &Path) -> Result<PathBuf, CoreError> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

fn effective_root(path: &Path, root: Option<&Path>) -> Result<PathBuf, CoreError> {
    normalize_path(root.unwrap_or(path))
}

/// `root/local`; an empty local spec keeps the trailing separator.
fn join_local(root: &Path, local: &str) -> PathBuf {
    root.join(local)
}

fn join_destination(destination: &str, segment: &str) -> String {
    if destination.ends_with('/') {
        format!("{destination}{segment}")
    } else {
        format!("{destination}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{TEMPLATE_BASIC, TEMPLATE_EXERCISE, TEMPLATE_ROS};
    use std::fs;

    #[test]
    fn pattern_yields_one_pair_per_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/a")).unwrap();
        fs::create_dir_all(dir.path().join("packages/b")).unwrap();
        fs::write(dir.path().join("packages/README.md"), "x").unwrap();

        let resolver = PathResolver::new(dir.path(), "demo", TEMPLATE_BASIC, "4");
        let paths = resolver.code_paths(None).unwrap();
        let root: PathBuf = dir.path().components().collect();
        assert_eq!(
            paths,
            vec![
                PathMapping {
                    local: root.join("packages/a"),
                    destination: "/code/demo/packages/a".to_owned(),
                },
                PathMapping {
                    local: root.join("packages/b"),
                    destination: "/code/demo/packages/b".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn pattern_skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/a")).unwrap();
        fs::create_dir_all(dir.path().join("packages/.cache")).unwrap();

        let resolver = PathResolver::new(dir.path(), "demo", TEMPLATE_BASIC, "4");
        let destinations: Vec<_> = resolver
            .code_paths(None)
            .unwrap()
            .into_iter()
            .map(|m| m.destination)
            .collect();
        assert_eq!(destinations, vec!["/code/demo/packages/a".to_owned()]);
    }

    #[test]
    fn normalize_folds_parent_components() {
        assert_eq!(
            normalize_path(Path::new("/p/demo/sub/../")).unwrap(),
            PathBuf::from("/p/demo")
        );
        assert_eq!(
            normalize_path(Path::new("/p/./demo/a/b/../..")).unwrap().to_str(),
            Some("/p/demo")
        );
        assert_eq!(normalize_path(Path::new("/..")).unwrap(), PathBuf::from("/"));
    }

    #[test]
    fn pattern_matches_are_rerooted_under_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/maps")).unwrap();

        let resolver = PathResolver::new(dir.path(), "ex", TEMPLATE_EXERCISE, "3");
        let paths = resolver.assets_paths(Some(Path::new("/remote/ex/"))).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].local, PathBuf::from("/remote/ex/assets/maps"));
        assert_eq!(paths[0].destination, "/code/catkin_ws/src/ex/assets/maps");
    }

    #[test]
    fn pattern_without_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(dir.path(), "demo", TEMPLATE_ROS, "4");
        assert!(resolver.code_paths(None).unwrap().is_empty());
    }

    #[test]
    fn plain_spec_yields_exactly_one_pair() {
        let resolver = PathResolver::new(Path::new("/projects/demo"), "demo", TEMPLATE_ROS, "2");
        let code = resolver.code_paths(Some(Path::new("/mnt/demo///"))).unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].local.to_str(), Some("/mnt/demo/"));
        assert_eq!(code[0].destination, "/code/catkin_ws/src/demo/");

        let code = resolver.code_paths(Some(Path::new("/mnt/x/../demo"))).unwrap();
        assert_eq!(code[0].local.to_str(), Some("/mnt/demo/"));

        let launch = resolver.launch_paths(None).unwrap();
        assert_eq!(launch.local, PathBuf::from("/projects/demo/launchers"));
        assert_eq!(launch.destination, "/launch/demo");
    }

    #[test]
    fn missing_rule_is_unsupported_template() {
        let resolver = PathResolver::new(Path::new("/p"), "demo", TEMPLATE_BASIC, "1");
        let err = resolver.assets_paths(None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedTemplate { kind: ArtifactKind::Assets, .. }
        ));
        assert_eq!(
            resolver.docs_path().unwrap(),
            PathBuf::from("/p/docs")
        );
    }
}
