//! Static template tables: where each artifact of a project lives on disk and
//! where it is mounted inside the image, per (project type, template version).

use serde::Serialize;
use std::fmt;

pub const TEMPLATE_BASIC: &str = "template-basic";
pub const TEMPLATE_ROS: &str = "template-ros";
pub const TEMPLATE_CORE: &str = "template-core";
pub const TEMPLATE_EXERCISE: &str = "template-exercise";

/// Wildcard suffix marking a local spec as a directory glob.
pub const PATTERN_MARKER: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Code,
    Launch,
    Assets,
    Docs,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Code => "code",
            ArtifactKind::Launch => "launch",
            ArtifactKind::Assets => "assets",
            ArtifactKind::Docs => "docs",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (local, destination) rule; `{name}` in the destination is replaced by
/// the project name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub local: &'static str,
    pub destination: &'static str,
}

impl MappingEntry {
    const fn new(local: &'static str, destination: &'static str) -> Self {
        Self { local, destination }
    }

    pub fn apply(&self, name: &str) -> (String, String) {
        (
            self.local.to_owned(),
            self.destination.replace("{name}", name),
        )
    }

    pub fn is_pattern(&self) -> bool {
        self.local.ends_with(PATTERN_MARKER)
    }
}

type Table = &'static [(&'static str, &'static str, MappingEntry)];

const BASIC_PACKAGES: MappingEntry = MappingEntry::new("code", "/packages/{name}/");
const BASIC_CODE: MappingEntry = MappingEntry::new("", "/code/{name}/");
const BASIC_CODE_PACKAGES: MappingEntry = MappingEntry::new("packages/*", "/code/{name}/packages");
const CATKIN_CODE: MappingEntry = MappingEntry::new("", "/code/catkin_ws/src/{name}/");
const CATKIN_PACKAGES: MappingEntry =
    MappingEntry::new("packages/*", "/code/catkin_ws/src/{name}/packages");

static CODE: Table = &[
    (TEMPLATE_BASIC, "1", BASIC_PACKAGES),
    (TEMPLATE_BASIC, "2", BASIC_CODE),
    (TEMPLATE_BASIC, "3", BASIC_CODE),
    (TEMPLATE_BASIC, "4", BASIC_CODE_PACKAGES),
    (TEMPLATE_ROS, "1", CATKIN_CODE),
    (TEMPLATE_ROS, "2", CATKIN_CODE),
    (TEMPLATE_ROS, "3", CATKIN_CODE),
    (TEMPLATE_ROS, "4", CATKIN_PACKAGES),
    (TEMPLATE_CORE, "1", CATKIN_CODE),
    (TEMPLATE_CORE, "2", CATKIN_CODE),
    (TEMPLATE_CORE, "3", CATKIN_CODE),
    (TEMPLATE_CORE, "4", CATKIN_PACKAGES),
    (TEMPLATE_EXERCISE, "3", CATKIN_PACKAGES),
    (TEMPLATE_EXERCISE, "4", CATKIN_PACKAGES),
];

const LAUNCH_FILE: MappingEntry = MappingEntry::new("launch.sh", "/launch/{name}/launch.sh");
const LAUNCHERS: MappingEntry = MappingEntry::new("launchers", "/launch/{name}");

static LAUNCH: Table = &[
    (TEMPLATE_BASIC, "1", LAUNCH_FILE),
    (TEMPLATE_BASIC, "2", LAUNCHERS),
    (TEMPLATE_BASIC, "3", LAUNCHERS),
    (TEMPLATE_BASIC, "4", LAUNCHERS),
    (TEMPLATE_ROS, "1", LAUNCH_FILE),
    (TEMPLATE_ROS, "2", LAUNCHERS),
    (TEMPLATE_ROS, "3", LAUNCHERS),
    (TEMPLATE_ROS, "4", LAUNCHERS),
    (TEMPLATE_CORE, "1", LAUNCH_FILE),
    (TEMPLATE_CORE, "2", LAUNCHERS),
    (TEMPLATE_CORE, "3", LAUNCHERS),
    (TEMPLATE_CORE, "4", LAUNCHERS),
    (TEMPLATE_EXERCISE, "3", LAUNCHERS),
    (TEMPLATE_EXERCISE, "4", LAUNCHERS),
];

const BASIC_ASSETS: MappingEntry = MappingEntry::new("assets", "/code/{name}/assets");
const CATKIN_ASSETS: MappingEntry = MappingEntry::new("assets", "/code/catkin_ws/src/{name}/assets");
const EXERCISE_ASSETS: MappingEntry =
    MappingEntry::new("assets/*", "/code/catkin_ws/src/{name}/assets");

static ASSETS: Table = &[
    (TEMPLATE_BASIC, "2", BASIC_ASSETS),
    (TEMPLATE_BASIC, "3", BASIC_ASSETS),
    (TEMPLATE_BASIC, "4", BASIC_ASSETS),
    (TEMPLATE_ROS, "2", CATKIN_ASSETS),
    (TEMPLATE_ROS, "3", CATKIN_ASSETS),
    (TEMPLATE_ROS, "4", CATKIN_ASSETS),
    (TEMPLATE_CORE, "2", CATKIN_ASSETS),
    (TEMPLATE_CORE, "3", CATKIN_ASSETS),
    (TEMPLATE_CORE, "4", CATKIN_ASSETS),
    (TEMPLATE_EXERCISE, "3", EXERCISE_ASSETS),
    (TEMPLATE_EXERCISE, "4", EXERCISE_ASSETS),
];

static DOCS: &[(&str, &str, &str)] = &[
    (TEMPLATE_BASIC, "1", "docs"),
    (TEMPLATE_BASIC, "2", "docs"),
    (TEMPLATE_BASIC, "3", "docs"),
    (TEMPLATE_BASIC, "4", "docs"),
    (TEMPLATE_ROS, "1", "docs"),
    (TEMPLATE_ROS, "2", "docs"),
    (TEMPLATE_ROS, "3", "docs"),
    (TEMPLATE_ROS, "4", "docs"),
    (TEMPLATE_CORE, "1", "docs"),
    (TEMPLATE_CORE, "2", "docs"),
    (TEMPLATE_CORE, "3", "docs"),
    (TEMPLATE_CORE, "4", "docs"),
    (TEMPLATE_EXERCISE, "3", "docs"),
    (TEMPLATE_EXERCISE, "4", "docs"),
];

/// Mapping rule for `kind`; `None` if the template has no rule for it.
///
/// Docs carry no destination and are looked up with [`docs_entry`].
pub fn lookup(kind: ArtifactKind, project_type: &str, version: &str) -> Option<MappingEntry> {
    let table = match kind {
        ArtifactKind::Code => CODE,
        ArtifactKind::Launch => LAUNCH,
        ArtifactKind::Assets => ASSETS,
        ArtifactKind::Docs => return None,
    };
    table
        .iter()
        .find(|(t, v, _)| *t == project_type && *v == version)
        .map(|(_, _, entry)| *entry)
}

/// Docs directory, relative to the project root.
pub fn docs_entry(project_type: &str, version: &str) -> Option<&'static str> {
    DOCS.iter()
        .find(|(t, v, _)| *t == project_type && *v == version)
        .map(|(_, _, dir)| *dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_substitutes_project_name() {
        let entry = lookup(ArtifactKind::Code, TEMPLATE_ROS, "2").unwrap();
        assert_eq!(
            entry.apply("demo"),
            (String::new(), "/code/catkin_ws/src/demo/".to_owned())
        );
        assert!(!entry.is_pattern());
    }

    #[test]
    fn v4_code_is_a_pattern() {
        for project_type in [TEMPLATE_BASIC, TEMPLATE_ROS, TEMPLATE_CORE, TEMPLATE_EXERCISE] {
            assert!(lookup(ArtifactKind::Code, project_type, "4").unwrap().is_pattern());
        }
    }

    #[test]
    fn launch_and_assets_tables_are_independent() {
        assert!(lookup(ArtifactKind::Launch, TEMPLATE_BASIC, "1").is_some());
        assert!(lookup(ArtifactKind::Assets, TEMPLATE_BASIC, "1").is_none());
        assert!(lookup(ArtifactKind::Code, TEMPLATE_EXERCISE, "2").is_none());
    }

    #[test]
    fn unknown_templates_have_no_rules() {
        assert!(lookup(ArtifactKind::Code, "template-unknown", "1").is_none());
        assert!(lookup(ArtifactKind::Code, TEMPLATE_BASIC, "*").is_none());
        assert!(docs_entry("template-unknown", "4").is_none());
        assert_eq!(docs_entry(TEMPLATE_CORE, "3"), Some("docs"));
    }
}
