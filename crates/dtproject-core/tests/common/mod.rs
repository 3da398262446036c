#![allow(dead_code)]

use dtproject_core::{ProjectLoader, RecipeCache};
use dtproject_runtime::mock::{MockRecipeClient, MockVcs};
use dtproject_runtime::{RecipeClient, VcsClient};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SELF_YAML: &str = "name: ''\n\
    maintainer:\n  name: Ada\n  email: ada@example.com\n  organization: Engines\n\
    description: A layered project\nicon: cube\nversion: 1.2.0\n";

/// Create `<parent>/<name>` with a `.dtproject` file holding `lines`.
pub fn legacy_project(parent: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(".dtproject"), lines.join("\n") + "\n").unwrap();
    dir
}

/// Create `<parent>/<name>` with the four required layers.
pub fn layered_project(parent: &Path, name: &str, template: &str, version: &str) -> PathBuf {
    let dir = parent.join(name);
    let layers = dir.join("dtproject");
    fs::create_dir_all(&layers).unwrap();
    fs::write(layers.join("self.yaml"), SELF_YAML).unwrap();
    fs::write(
        layers.join("template.yaml"),
        format!("name: {template}\nversion: {version}\n"),
    )
    .unwrap();
    fs::write(layers.join("distro.yaml"), "name: ente\n").unwrap();
    fs::write(layers.join("base.yaml"), "repository: base\norganization: org\n").unwrap();
    dir
}

pub fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Mark `dir` as a git working copy; repository state comes from the mock.
pub fn init_git(dir: &Path) {
    fs::create_dir_all(dir.join(".git")).unwrap();
}

pub fn loader(vcs: MockVcs, recipes: Arc<MockRecipeClient>, cache: &Path) -> ProjectLoader {
    let vcs: Arc<dyn VcsClient> = Arc::new(vcs);
    let recipes: Arc<dyn RecipeClient> = recipes;
    ProjectLoader::new(vcs, recipes, RecipeCache::new(cache))
}

pub fn simple_loader(vcs: MockVcs) -> ProjectLoader {
    loader(
        vcs,
        Arc::new(MockRecipeClient::new()),
        Path::new("/nonexistent/recipes"),
    )
}
