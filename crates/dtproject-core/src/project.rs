use crate::config::Settings;
use crate::configurations::{parse_configurations, Configurations, CONFIGURATIONS_FILE};
use crate::image::{assert_canonical_arch, manifest_tag, release_tag, sanitize_version, ImageSpec};
use crate::paths::{PathMapping, PathResolver};
use crate::recipe::{RecipeCache, RecipeRef};
use crate::selector::{resolve, Adapter, ProjectDescriptor, ResolvedProject};
use crate::CoreError;
use dtproject_remote::MetadataClient;
use dtproject_runtime::{
    ContainerClient, GitCli, GitRecipeClient, ImageInspection, RecipeClient, RepositoryInfo,
    VcsClient, NOT_DEFINED,
};
use dtproject_schema::rules::RECIPE_CONSUMER_TYPE;
use dtproject_schema::{Descriptor, DescriptorError, Layers, PATH_KEY};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Version name used when there is no repository to derive one from.
pub const DEFAULT_VERSION_NAME: &str = "latest";

pub const LAUNCHERS_DIR: &str = "launchers";
pub const DOCKERFILE: &str = "Dockerfile";
pub const VSCODE_DOCKERFILE: &str = "Dockerfile.vscode";
pub const VNC_DOCKERFILE: &str = "Dockerfile.vnc";

/// Oldest template version with launchers and configurations.
const LAUNCHERS_MIN_VERSION: u32 = 2;
const CONFIGURATIONS_VERSION: &str = "2";

/// Loads projects with a shared set of collaborators.
#[derive(Clone)]
pub struct ProjectLoader {
    vcs: Arc<dyn VcsClient>,
    recipes: Arc<dyn RecipeClient>,
    cache: RecipeCache,
}

impl ProjectLoader {
    pub fn new(vcs: Arc<dyn VcsClient>, recipes: Arc<dyn RecipeClient>, cache: RecipeCache) -> Self {
        Self {
            vcs,
            recipes,
            cache,
        }
    }

    /// Loader backed by the `git` command line, configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(GitCli::with_program(settings.git.clone())),
            Arc::new(GitRecipeClient::new().with_program(settings.git.clone())),
            RecipeCache::new(&settings.recipes_dir),
        )
    }

    pub fn load(&self, path: &Path) -> Result<Project, CoreError> {
        let resolved = resolve(path, self.vcs.as_ref())?;
        Ok(Project {
            resolved,
            loader: self.clone(),
            custom_recipe_dir: None,
            recipe_version: None,
        })
    }
}

/// Read model over one resolved project directory.
pub struct Project {
    resolved: ResolvedProject,
    loader: ProjectLoader,
    custom_recipe_dir: Option<PathBuf>,
    recipe_version: Option<String>,
}

impl Project {
    pub fn path(&self) -> &Path {
        &self.resolved.path
    }

    pub fn descriptor(&self) -> &dyn Descriptor {
        self.resolved.descriptor.as_descriptor()
    }

    pub fn repository(&self) -> Option<&RepositoryInfo> {
        self.resolved.repository.as_ref()
    }

    /// Declared name, else repository name, else directory name; lower-cased.
    pub fn name(&self) -> String {
        let name = self
            .descriptor()
            .declared_name()
            .map(str::to_owned)
            .or_else(|| self.repository().and_then(|r| r.name.clone()))
            .or_else(|| {
                self.path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_default();
        name.to_lowercase()
    }

    pub fn description(&self) -> Result<&str, CoreError> {
        Ok(self.descriptor().description()?)
    }

    pub fn maintainer(&self) -> Result<String, CoreError> {
        Ok(self.descriptor().maintainer()?)
    }

    pub fn icon(&self) -> Result<&str, CoreError> {
        Ok(self.descriptor().icon()?)
    }

    pub fn layers(&self) -> Result<&Layers, CoreError> {
        Ok(self.descriptor().layers()?)
    }

    pub fn version(&self) -> &str {
        self.descriptor().version()
    }

    pub fn project_type(&self) -> &str {
        self.descriptor().project_type()
    }

    pub fn type_version(&self) -> &str {
        self.descriptor().type_version()
    }

    /// Flat metadata view, always including the project path.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = self.descriptor().metadata();
        metadata
            .entry(PATH_KEY.to_owned())
            .or_insert_with(|| self.path().to_string_lossy().into_owned());
        metadata
    }

    /// Target distribution. Flat projects derive it from the branch name.
    pub fn distro(&self) -> String {
        match &self.resolved.descriptor {
            ProjectDescriptor::Layered(layers) => layers.distro.name.clone(),
            ProjectDescriptor::Legacy(_) => self.repository().map_or_else(
                || DEFAULT_VERSION_NAME.to_owned(),
                |r| r.branch.split('-').next().unwrap_or_default().to_owned(),
            ),
        }
    }

    pub fn head_version(&self) -> &str {
        self.repository()
            .map_or(DEFAULT_VERSION_NAME, |r| r.head_version.as_str())
    }

    pub fn closest_version(&self) -> &str {
        self.repository()
            .map_or(DEFAULT_VERSION_NAME, |r| r.closest_version.as_str())
    }

    /// Branch name, or the head tag when detached.
    pub fn version_name(&self) -> &str {
        match self.repository() {
            Some(r) if r.branch != "HEAD" => &r.branch,
            Some(_) => self.head_version(),
            None => DEFAULT_VERSION_NAME,
        }
    }

    pub fn safe_version_name(&self) -> String {
        sanitize_version(self.version_name())
    }

    pub fn url(&self) -> Option<&str> {
        self.repository().and_then(|r| r.page_url.as_deref())
    }

    pub fn sha(&self) -> &str {
        self.repository().map_or(NOT_DEFINED, |r| r.sha.as_str())
    }

    pub fn adapters(&self) -> &[Adapter] {
        &self.resolved.adapters
    }

    pub fn is_clean(&self) -> bool {
        !self
            .repository()
            .is_some_and(|r| r.index_modified + r.index_added > 0)
    }

    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    pub fn is_detached(&self) -> bool {
        self.repository().is_some_and(|r| r.detached)
    }

    /// Clean working copy whose HEAD carries a tag.
    pub fn is_release(&self) -> bool {
        self.is_clean()
            && self
                .repository()
                .is_some_and(|r| r.head_version != NOT_DEFINED)
    }

    // --- recipe ---

    pub fn needs_recipe(&self) -> bool {
        self.project_type() == RECIPE_CONSUMER_TYPE
    }

    /// Use `path` as the recipe instead of the cached clone. Overrides are never updated.
    pub fn set_recipe_dir(&mut self, path: impl Into<PathBuf>) {
        self.custom_recipe_dir = Some(path.into());
    }

    /// Use `branch` instead of the declared recipe branch.
    pub fn set_recipe_version(&mut self, branch: impl Into<String>) {
        self.recipe_version = Some(branch.into());
    }

    /// Recipe coordinates, with the version override applied.
    pub fn recipe_ref(&self) -> Result<Option<RecipeRef>, CoreError> {
        if !self.needs_recipe() {
            return Ok(None);
        }
        let recipe = RecipeRef::from_descriptor(&self.resolved.descriptor, self.path())?;
        Ok(Some(match &self.recipe_version {
            Some(branch) => recipe.with_branch(branch),
            None => recipe,
        }))
    }

    pub fn recipe_dir(&self) -> Result<Option<PathBuf>, CoreError> {
        if !self.needs_recipe() {
            return Ok(None);
        }
        if let Some(dir) = &self.custom_recipe_dir {
            return Ok(Some(dir.clone()));
        }
        Ok(self
            .recipe_ref()?
            .map(|recipe| self.loader.cache.project_dir(&recipe)))
    }

    /// Load the recipe project. Does not clone; see [`Project::ensure_recipe_exists`].
    pub fn recipe(&self) -> Result<Option<Project>, CoreError> {
        let Some(dir) = self.recipe_dir()? else {
            return Ok(None);
        };
        if !dir.exists() {
            return Err(CoreError::RecipeNotFound(format!(
                "recipe not found at '{}'",
                dir.display()
            )));
        }
        self.loader.load(&dir).map(Some)
    }

    /// Clone the recipe repository unless the recipe directory already exists.
    pub fn ensure_recipe_exists(&self) -> Result<(), CoreError> {
        let Some(dir) = self.recipe_dir()? else {
            return Ok(());
        };
        if !dir.exists() && self.custom_recipe_dir.is_none() {
            if let Some(recipe) = self.recipe_ref()? {
                let destination = self.loader.cache.repository_dir(&recipe);
                let cloned =
                    self.loader
                        .recipes
                        .clone_recipe(&recipe.repository, &recipe.branch, &destination)?;
                if !cloned {
                    return Err(CoreError::RecipeNotFound(format!(
                        "recipe repository '{}' could not be downloaded",
                        recipe.repository
                    )));
                }
            }
        }
        if !dir.exists() {
            return Err(CoreError::RecipeNotFound(format!(
                "recipe not found at '{}'",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Pull the cached recipe clone. Returns whether anything changed; always
    /// `false` with a custom recipe directory.
    pub fn ensure_recipe_updated(&self) -> Result<bool, CoreError> {
        if self.custom_recipe_dir.is_some() {
            debug!("custom recipe directory in use, not updating");
            return Ok(false);
        }
        let Some(recipe) = self.recipe_ref()? else {
            return Ok(false);
        };
        let destination = self.loader.cache.repository_dir(&recipe);
        info!("updating recipe {} ({})", recipe.repository, recipe.branch);
        Ok(self
            .loader
            .recipes
            .update_recipe(&recipe.repository, &recipe.branch, &destination)?)
    }

    // --- files ---

    /// The Dockerfile that builds this project, the recipe's if it needs one.
    pub fn dockerfile(&self) -> Result<PathBuf, CoreError> {
        match self.recipe()? {
            Some(recipe) => recipe.dockerfile(),
            None => Ok(self.path().join(DOCKERFILE)),
        }
    }

    pub fn vscode_dockerfile(&self) -> Result<Option<PathBuf>, CoreError> {
        self.variant_dockerfile(VSCODE_DOCKERFILE)
    }

    pub fn vnc_dockerfile(&self) -> Result<Option<PathBuf>, CoreError> {
        self.variant_dockerfile(VNC_DOCKERFILE)
    }

    fn variant_dockerfile(&self, file: &str) -> Result<Option<PathBuf>, CoreError> {
        let own = self.path().join(file);
        if own.exists() {
            return Ok(Some(own));
        }
        match self.recipe()? {
            Some(recipe) => recipe.variant_dockerfile(file),
            None => Ok(None),
        }
    }

    /// Launcher files by stem. Recipe launchers replace project launchers of
    /// the same name.
    pub fn launcher_files(&self) -> Result<BTreeMap<String, PathBuf>, CoreError> {
        let supported = self
            .type_version()
            .parse::<u32>()
            .is_ok_and(|v| v >= LAUNCHERS_MIN_VERSION);
        if !supported {
            return Err(DescriptorError::NotImplemented {
                field: "launchers",
                version: self.type_version().to_owned(),
            }
            .into());
        }

        let mut roots = vec![self.path().to_path_buf()];
        if let Some(recipe) = self.recipe()? {
            roots.push(recipe.path().to_path_buf());
        }
        let mut launchers = BTreeMap::new();
        for root in roots {
            let dir = root.join(LAUNCHERS_DIR);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if !path.is_file() || !is_launcher(&path)? {
                    continue;
                }
                if let Some(stem) = path.file_stem() {
                    launchers.insert(stem.to_string_lossy().into_owned(), path);
                }
            }
        }
        Ok(launchers)
    }

    /// Launcher names, sorted.
    pub fn launchers(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.launcher_files()?.into_keys().collect())
    }

    pub fn configurations(&self) -> Result<Configurations, CoreError> {
        if self.type_version() != CONFIGURATIONS_VERSION {
            return Err(DescriptorError::NotImplemented {
                field: "configurations",
                version: self.type_version().to_owned(),
            }
            .into());
        }
        let file = self.path().join(CONFIGURATIONS_FILE);
        if file.is_file() {
            parse_configurations(&file)
        } else {
            Ok(Configurations::new())
        }
    }

    pub fn configuration(&self, name: &str) -> Result<serde_json::Value, CoreError> {
        self.configurations()?
            .remove(name)
            .ok_or_else(|| CoreError::Usage(format!("configuration with name '{name}' not found")))
    }

    // --- paths ---

    /// Path resolver bound to this project's name and template.
    ///
    /// Borrows `name`, which callers obtain from [`Project::name`].
    pub fn path_resolver<'a>(&'a self, name: &'a str) -> PathResolver<'a> {
        PathResolver::new(self.path(), name, self.project_type(), self.type_version())
    }

    pub fn code_paths(&self, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        self.path_resolver(&self.name()).code_paths(root)
    }

    pub fn launch_paths(&self, root: Option<&Path>) -> Result<PathMapping, CoreError> {
        self.path_resolver(&self.name()).launch_paths(root)
    }

    pub fn assets_paths(&self, root: Option<&Path>) -> Result<Vec<PathMapping>, CoreError> {
        self.path_resolver(&self.name()).assets_paths(root)
    }

    pub fn docs_path(&self) -> Result<PathBuf, CoreError> {
        self.path_resolver(&self.name()).docs_path()
    }

    // --- images ---

    pub fn image(&self, spec: &ImageSpec) -> Result<String, CoreError> {
        spec.tag(&self.name(), &self.safe_version_name())
    }

    pub fn image_vscode(&self, spec: &ImageSpec) -> Result<String, CoreError> {
        self.image(&spec.clone().loop_mode(false).extra("vscode"))
    }

    pub fn image_vnc(&self, spec: &ImageSpec) -> Result<String, CoreError> {
        self.image(&spec.clone().loop_mode(false).extra("vnc"))
    }

    /// Tag of a release build; the repository must be clean and tagged at HEAD.
    pub fn image_release(
        &self,
        arch: &str,
        registry: &str,
        owner: &str,
        docs: bool,
    ) -> Result<String, CoreError> {
        if !self.is_release() {
            return Err(CoreError::Usage(
                "the project repository is not in a release state".to_owned(),
            ));
        }
        release_tag(&self.name(), self.head_version(), arch, registry, owner, docs)
    }

    pub fn manifest(&self, registry: &str, owner: &str, version: Option<&str>) -> String {
        let version = version.map_or_else(|| self.safe_version_name(), str::to_owned);
        manifest_tag(&self.name(), registry, owner, &version)
    }

    /// Inspect the local image built for `spec`.
    pub fn image_metadata(
        &self,
        container: &dyn ContainerClient,
        spec: &ImageSpec,
    ) -> Result<ImageInspection, CoreError> {
        let image = self.image(spec)?;
        debug!("inspecting {image} with {}", container.name());
        Ok(container.inspect_image(&image)?)
    }

    pub fn image_labels(
        &self,
        container: &dyn ContainerClient,
        spec: &ImageSpec,
    ) -> Result<BTreeMap<String, String>, CoreError> {
        Ok(self.image_metadata(container, spec)?.labels())
    }

    /// Metadata of the published image for `<version_name>-<arch>`.
    pub fn remote_image_metadata(
        &self,
        client: &dyn MetadataClient,
        arch: &str,
        registry: &str,
        owner: &str,
    ) -> Result<serde_json::Value, CoreError> {
        assert_canonical_arch(arch)?;
        let tag = format!("{}-{arch}", self.version_name());
        Ok(client.image_metadata(registry, owner, &self.name(), &tag)?)
    }
}

/// Executable, or a script starting with a shebang.
fn is_launcher(path: &Path) -> Result<bool, CoreError> {
    if is_executable(path)? {
        return Ok(true);
    }
    let mut head = [0u8; 2];
    let mut file = fs::File::open(path)?;
    let n = file.read(&mut head)?;
    Ok(n == 2 && &head == b"#!")
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool, CoreError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool, CoreError> {
    Ok(false)
}
