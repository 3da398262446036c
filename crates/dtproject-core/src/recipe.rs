//! Location of recipe projects in the local clone cache.

use crate::selector::ProjectDescriptor;
use crate::CoreError;
use dtproject_schema::rules::RECIPE_LAYER;
use dtproject_schema::DescriptorError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Coordinates of the recipe a project builds from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRef {
    /// `owner/repo` or a full clone URL.
    pub repository: String,
    pub branch: String,
    /// Directory of the recipe project inside the repository.
    pub location: String,
}

impl RecipeRef {
    /// Read the recipe coordinates declared by `descriptor`.
    ///
    /// Flat descriptors carry them as `RECIPE_*` keys, layered ones in the
    /// `recipe` layer.
    pub fn from_descriptor(descriptor: &ProjectDescriptor, path: &Path) -> Result<Self, CoreError> {
        let field = |key: &str| -> Result<String, CoreError> {
            let value = match descriptor {
                ProjectDescriptor::Legacy(meta) => {
                    meta.get(&format!("RECIPE_{}", key.to_uppercase())).map(str::to_owned)
                }
                ProjectDescriptor::Layered(layers) => layers.custom_field(RECIPE_LAYER, key),
            };
            value.ok_or_else(|| {
                CoreError::from(DescriptorError::Malformed {
                    path: path.to_path_buf(),
                    reason: format!("recipe field '{key}' is not declared"),
                })
            })
        };
        Ok(Self {
            repository: field("repository")?,
            branch: field("branch")?,
            location: field("location")?,
        })
    }

    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_owned();
        self
    }
}

/// Cache of recipe clones, laid out as `<root>/<repository>/<branch>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCache {
    root: PathBuf,
}

impl RecipeCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the repository of `recipe` is cloned into.
    pub fn repository_dir(&self, recipe: &RecipeRef) -> PathBuf {
        let slug = recipe
            .repository
            .trim_matches('/')
            .trim_end_matches(".git")
            .replace(['/', ':'], "__");
        self.root.join(slug).join(&recipe.branch)
    }

    /// Directory of the recipe project itself.
    pub fn project_dir(&self, recipe: &RecipeRef) -> PathBuf {
        let location = recipe.location.trim_matches('/');
        let repo = self.repository_dir(recipe);
        if location.is_empty() {
            repo
        } else {
            repo.join(location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> RecipeRef {
        RecipeRef {
            repository: "org/recipes".to_owned(),
            branch: "ente".to_owned(),
            location: "/exercises/lane-following/".to_owned(),
        }
    }

    #[test]
    fn cache_layout() {
        let cache = RecipeCache::new("/cache");
        assert_eq!(
            cache.repository_dir(&recipe()),
            PathBuf::from("/cache/org__recipes/ente")
        );
        assert_eq!(
            cache.project_dir(&recipe()),
            PathBuf::from("/cache/org__recipes/ente/exercises/lane-following")
        );
    }

    #[test]
    fn branch_override_changes_directory() {
        let cache = RecipeCache::new("/cache");
        assert_eq!(
            cache.project_dir(&recipe().with_branch("daffy")),
            PathBuf::from("/cache/org__recipes/daffy/exercises/lane-following")
        );
    }

    #[test]
    fn empty_location_is_repository_root() {
        let cache = RecipeCache::new("/cache");
        let mut r = recipe();
        r.location = String::new();
        assert_eq!(cache.project_dir(&r), cache.repository_dir(&r));
    }
}
