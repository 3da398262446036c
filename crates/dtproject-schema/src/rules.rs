//! Required-field tables, keyed by format version and by (project type, version).
//!
//! All tables are static and read-only for the lifetime of the process.

/// Key under which the version-agnostic requirements are registered.
pub const ANY_VERSION: &str = "*";

/// The project type that builds from an external recipe project.
pub const RECIPE_CONSUMER_TYPE: &str = "template-exercise";

/// Custom layer carrying the recipe coordinates of layered projects.
pub const RECIPE_LAYER: &str = "recipe";

static REQUIRED_METADATA_KEYS: &[(&str, &[&str])] = &[
    (ANY_VERSION, &["TYPE_VERSION"]),
    ("1", &["TYPE", "VERSION"]),
    ("2", &["TYPE", "VERSION"]),
    ("3", &["TYPE", "VERSION"]),
];

static REQUIRED_METADATA_PER_TYPE_KEYS: &[(&str, &str, &[&str])] = &[(
    RECIPE_CONSUMER_TYPE,
    "3",
    &["RECIPE_REPOSITORY", "RECIPE_BRANCH", "RECIPE_LOCATION"],
)];

/// (layer, field) pairs a layered project of a given type must declare.
static REQUIRED_LAYER_FIELDS_PER_TYPE: &[(&str, &str, &[(&str, &str)])] = &[(
    RECIPE_CONSUMER_TYPE,
    "4",
    &[
        (RECIPE_LAYER, "repository"),
        (RECIPE_LAYER, "branch"),
        (RECIPE_LAYER, "location"),
    ],
)];

/// Keys every flat descriptor must carry, whatever its version.
pub fn version_agnostic_keys() -> &'static [&'static str] {
    lookup_version(ANY_VERSION).unwrap_or(&[])
}

/// Keys required by a concrete flat-format version.
///
/// Returns `None` for the wildcard and for versions without registered rules;
/// both mean the version is unsupported.
pub fn version_keys(version: &str) -> Option<&'static [&'static str]> {
    if version == ANY_VERSION {
        return None;
    }
    lookup_version(version)
}

/// Extra keys required for `project_type` at `version`; empty if none are registered.
pub fn type_keys(project_type: &str, version: &str) -> &'static [&'static str] {
    REQUIRED_METADATA_PER_TYPE_KEYS
        .iter()
        .find(|(t, v, _)| *t == project_type && *v == version)
        .map(|(_, _, keys)| *keys)
        .unwrap_or(&[])
}

/// Custom-layer fields required for a layered project of `project_type` at `version`.
pub fn layer_fields(project_type: &str, version: &str) -> &'static [(&'static str, &'static str)] {
    REQUIRED_LAYER_FIELDS_PER_TYPE
        .iter()
        .find(|(t, v, _)| *t == project_type && *v == version)
        .map(|(_, _, fields)| *fields)
        .unwrap_or(&[])
}

fn lookup_version(version: &str) -> Option<&'static [&'static str]> {
    REQUIRED_METADATA_KEYS
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, keys)| *keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_not_a_concrete_version() {
        assert!(version_keys("*").is_none());
        assert!(version_keys("9").is_none());
        assert!(version_keys("2").is_some());
    }

    #[test]
    fn type_rules_only_for_registered_pairs() {
        assert_eq!(type_keys("template-exercise", "3").len(), 3);
        assert!(type_keys("template-exercise", "2").is_empty());
        assert!(type_keys("template-basic", "3").is_empty());
    }

    #[test]
    fn layered_exercise_requires_recipe_layer() {
        let fields = layer_fields("template-exercise", "4");
        assert!(fields.iter().all(|(layer, _)| *layer == RECIPE_LAYER));
        assert!(layer_fields("template-ros", "4").is_empty());
    }
}
