use crate::CoreError;
use dtproject_remote::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative settings file.
pub const CONFIG_ENV: &str = "DTPROJECT_CONFIG";
/// Environment variable overriding [`Settings::recipes_dir`].
pub const RECIPES_DIR_ENV: &str = "DTPROJECT_RECIPES_DIR";

pub const DEFAULT_METADATA_URL: &str =
    "https://metadata.dtproject.io/v1/{registry}/{organization}/{repository}/{tag}/metadata.json";

/// User settings, read from `~/.config/dtproject/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cache root for recipe clones.
    pub recipes_dir: PathBuf,
    /// URL template of the remote image metadata service.
    pub metadata_url: String,
    pub docker_host: Option<String>,
    pub git: String,
    pub docker: String,
}

impl Default for Settings {
    fn default() -> Self {
        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        Self {
            recipes_dir: home.join(".dtproject").join("recipes"),
            metadata_url: DEFAULT_METADATA_URL.to_owned(),
            docker_host: None,
            git: "git".to_owned(),
            docker: "docker".to_owned(),
        }
    }
}

impl Settings {
    /// Load from `$DTPROJECT_CONFIG` or the default location, then apply
    /// environment overrides. A missing file yields the defaults.
    pub fn load_default() -> Result<Self, CoreError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        let mut settings = if path.exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("invalid settings '{}': {e}", path.display())))
    }

    fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(RECIPES_DIR_ENV).filter(|d| !d.is_empty()) {
            self.recipes_dir = PathBuf::from(dir);
        }
    }

    pub fn remote(&self) -> Result<RemoteConfig, CoreError> {
        Ok(RemoteConfig::new(&self.metadata_url)?)
    }
}

fn default_config_path() -> Result<PathBuf, CoreError> {
    let home = std::env::var("HOME").map_err(|_| CoreError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/dtproject/config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_overrides_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "recipes_dir = \"/var/cache/recipes\"\n\
             metadata_url = \"http://m/{registry}/{organization}/{repository}/{tag}\"\n\
             docker_host = \"tcp://robot.local:2375\"\n\
             git = \"/usr/bin/git\"\n\
             docker = \"podman\"\n",
        )
        .unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.recipes_dir, PathBuf::from("/var/cache/recipes"));
        assert_eq!(settings.docker_host.as_deref(), Some("tcp://robot.local:2375"));
        assert_eq!(settings.git, "/usr/bin/git");
        assert!(settings.remote().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "docker = \"podman\"\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.docker, "podman");
        assert_eq!(settings.git, "git");
        assert_eq!(settings.metadata_url, DEFAULT_METADATA_URL);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "recipes_dir = [").unwrap();
        assert!(matches!(Settings::load(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn default_metadata_url_is_a_valid_template() {
        let remote = Settings::default().remote().unwrap();
        assert!(remote
            .image_metadata_url("docker.io", "org", "demo", "ente-amd64")
            .contains("/docker.io/org/demo/ente-amd64/"));
    }
}
