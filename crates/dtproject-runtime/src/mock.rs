//! In-memory collaborators for tests and offline use.

use crate::container::{ContainerClient, ImageInspection};
use crate::recipe::RecipeClient;
use crate::vcs::{RepositoryInfo, VcsClient, NOT_DEFINED};
use crate::RuntimeError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// [`VcsClient`] answering every path with the same repository state.
pub struct MockVcs {
    info: RepositoryInfo,
}

impl MockVcs {
    pub fn new(info: RepositoryInfo) -> Self {
        Self { info }
    }

    /// A clean repository named `name` on branch `branch`, without tags.
    pub fn clean(name: &str, branch: &str) -> Self {
        Self::new(RepositoryInfo {
            name: Some(name.to_owned()),
            sha: "0123456789abcdef0123456789abcdef01234567".to_owned(),
            branch: branch.to_owned(),
            detached: branch == "HEAD",
            head_version: NOT_DEFINED.to_owned(),
            closest_version: NOT_DEFINED.to_owned(),
            origin_url: format!("git@github.com:org/{name}.git"),
            page_url: Some(format!("https://github.com/org/{name}")),
            index_modified: 0,
            index_added: 0,
        })
    }

    #[must_use]
    pub fn with_head_tag(mut self, tag: &str) -> Self {
        self.info.head_version = tag.to_owned();
        self.info.closest_version = tag.to_owned();
        self
    }

    #[must_use]
    pub fn with_changes(mut self, modified: usize, added: usize) -> Self {
        self.info.index_modified = modified;
        self.info.index_added = added;
        self
    }
}

impl VcsClient for MockVcs {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn repository_info(&self, _path: &Path) -> Result<RepositoryInfo, RuntimeError> {
        Ok(self.info.clone())
    }
}

/// [`ContainerClient`] over a fixed set of images.
#[derive(Default)]
pub struct MockContainer {
    images: HashMap<String, ImageInspection>,
}

impl MockContainer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_image(mut self, reference: &str, image: ImageInspection) -> Self {
        self.images.insert(reference.to_owned(), image);
        self
    }
}

impl ContainerClient for MockContainer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn inspect_image(&self, reference: &str) -> Result<ImageInspection, RuntimeError> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchImage(reference.to_owned()))
    }
}

/// A recorded call to [`MockRecipeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCall {
    pub op: &'static str,
    pub repository: String,
    pub branch: String,
    pub destination: PathBuf,
}

/// [`RecipeClient`] that "clones" by writing a fixed file tree.
#[derive(Default)]
pub struct MockRecipeClient {
    files: Vec<(PathBuf, String)>,
    unreachable: bool,
    calls: Mutex<Vec<RecipeCall>>,
}

impl MockRecipeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, relative to the clone destination, written on clone.
    #[must_use]
    pub fn with_file(mut self, relative: impl Into<PathBuf>, content: &str) -> Self {
        self.files.push((relative.into(), content.to_owned()));
        self
    }

    /// Make every clone report that the repository could not be downloaded.
    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn calls(&self) -> Vec<RecipeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, op: &'static str, repository: &str, branch: &str, destination: &Path) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecipeCall {
                op,
                repository: repository.to_owned(),
                branch: branch.to_owned(),
                destination: destination.to_path_buf(),
            });
        }
    }
}

impl RecipeClient for MockRecipeClient {
    fn clone_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError> {
        self.record("clone", repository, branch, destination);
        if self.unreachable {
            return Ok(false);
        }
        fs::create_dir_all(destination)?;
        for (relative, content) in &self.files {
            let path = destination.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(true)
    }

    fn update_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError> {
        self.record("update", repository, branch, destination);
        if !destination.exists() {
            return Err(RuntimeError::NotCloned(destination.to_path_buf()));
        }
        Ok(false)
    }
}
