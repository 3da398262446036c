use crate::process::run;
use crate::RuntimeError;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Fetches and refreshes recipe repositories into a local directory.
pub trait RecipeClient: Send + Sync {
    /// Clone `repository` at `branch` into `destination`. Returns `false` if
    /// the repository could not be downloaded.
    fn clone_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError>;

    /// Bring an existing clone up to date. Returns `true` if new commits were pulled.
    fn update_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError>;
}

/// [`RecipeClient`] backed by the `git` command line.
pub struct GitRecipeClient {
    program: String,
    provider: String,
}

impl Default for GitRecipeClient {
    fn default() -> Self {
        Self {
            program: "git".to_owned(),
            provider: "github.com".to_owned(),
        }
    }
}

impl GitRecipeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host used for `owner/repo` shorthand repositories.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Clone URL for `repository`, expanding `owner/repo` shorthand.
    pub fn remote_url(&self, repository: &str) -> String {
        if repository.contains("://") || repository.starts_with("git@") {
            repository.to_owned()
        } else {
            format!("https://{}/{}", self.provider, repository.trim_matches('/'))
        }
    }

    fn head(&self, destination: &Path) -> Result<String, RuntimeError> {
        let out = run(
            &self.program,
            [OsStr::new("-C"), destination.as_os_str(), OsStr::new("rev-parse"), OsStr::new("HEAD")],
        )?;
        if !out.success() {
            return Err(out.into_failure());
        }
        Ok(out.first_line().unwrap_or_default().to_owned())
    }
}

impl RecipeClient for GitRecipeClient {
    fn clone_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let url = self.remote_url(repository);
        info!("cloning recipe {url} ({branch}) into {}", destination.display());
        let out = run(
            &self.program,
            [
                OsStr::new("clone"),
                OsStr::new("--branch"),
                OsStr::new(branch),
                OsStr::new(&url),
                destination.as_os_str(),
            ],
        )?;
        if !out.success() {
            warn!("recipe clone failed: {}", out.stderr.trim());
        }
        Ok(out.success())
    }

    fn update_recipe(
        &self,
        repository: &str,
        branch: &str,
        destination: &Path,
    ) -> Result<bool, RuntimeError> {
        if !destination.join(".git").exists() {
            return Err(RuntimeError::NotCloned(destination.to_path_buf()));
        }
        let before = self.head(destination)?;
        info!("updating recipe {repository} ({branch}) at {}", destination.display());
        let out = run(
            &self.program,
            [
                OsStr::new("-C"),
                destination.as_os_str(),
                OsStr::new("pull"),
                OsStr::new("--ff-only"),
                OsStr::new("origin"),
                OsStr::new(branch),
            ],
        )?;
        if !out.success() {
            return Err(out.into_failure());
        }
        Ok(self.head(destination)? != before)
    }
}
