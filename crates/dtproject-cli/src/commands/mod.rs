pub mod ci_metadata;
pub mod image;
pub mod info;
pub mod launchers;
pub mod paths;
pub mod recipe;
pub mod remote;

use clap::{Args, ValueEnum};
use dtproject_core::{canonical_arch, ArtifactKind, CoreError, ImageSpec, Project, ProjectLoader, Settings};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_DESCRIPTOR_ERROR: u8 = 2;
pub const EXIT_USAGE_ERROR: u8 = 3;

/// Everything a command needs, built once from the global flags.
pub struct Context {
    pub settings: Settings,
    pub loader: ProjectLoader,
    pub project: PathBuf,
    pub recipe_dir: Option<PathBuf>,
    pub recipe_version: Option<String>,
    pub json: bool,
}

impl Context {
    /// Load the selected project with the recipe overrides applied.
    pub fn load(&self) -> Result<Project, CoreError> {
        let mut project = self.loader.load(&self.project)?;
        if let Some(dir) = &self.recipe_dir {
            project.set_recipe_dir(dir);
        }
        if let Some(version) = &self.recipe_version {
            project.set_recipe_version(version);
        }
        Ok(project)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathKind {
    Code,
    Launch,
    Assets,
    Docs,
}

impl From<PathKind> for ArtifactKind {
    fn from(kind: PathKind) -> Self {
        match kind {
            PathKind::Code => ArtifactKind::Code,
            PathKind::Launch => ArtifactKind::Launch,
            PathKind::Assets => ArtifactKind::Assets,
            PathKind::Docs => ArtifactKind::Docs,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ImageArgs {
    /// Target architecture (amd64, arm32v7, arm64v8). Defaults to the host's.
    #[arg(long)]
    pub arch: Option<String>,
    #[arg(long, default_value = "docker.io")]
    pub registry: String,
    #[arg(long)]
    pub owner: String,
    /// Version part of the tag. Defaults to the branch or head tag.
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long = "loop", default_value_t = false)]
    pub loop_mode: bool,
    #[arg(long, default_value_t = false)]
    pub docs: bool,
}

impl ImageArgs {
    pub fn arch(&self) -> Result<String, CoreError> {
        match &self.arch {
            Some(arch) => Ok(arch.clone()),
            None => canonical_arch(std::env::consts::ARCH).map(str::to_owned),
        }
    }

    pub fn spec(&self) -> Result<ImageSpec, CoreError> {
        let mut spec = ImageSpec::new(&self.arch()?, &self.registry, &self.owner)
            .loop_mode(self.loop_mode)
            .docs(self.docs);
        if let Some(tag) = &self.tag {
            spec = spec.version(tag.as_str());
        }
        Ok(spec)
    }
}

pub fn exit_code_for(error: &CoreError) -> u8 {
    match error {
        e if e.is_not_found() || e.is_invalid_descriptor() => EXIT_DESCRIPTOR_ERROR,
        e if e.is_not_implemented() => EXIT_USAGE_ERROR,
        CoreError::Usage(_) | CoreError::UnsupportedTemplate { .. } | CoreError::Config(_) => {
            EXIT_USAGE_ERROR
        }
        _ => EXIT_FAILURE,
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Render a boolean repository flag, green when it holds.
pub fn colorize_flag(label: &str, value: bool) -> String {
    use console::Style;
    if value {
        Style::new().green().apply_to(label).to_string()
    } else {
        Style::new().dim().apply_to(format!("not {label}")).to_string()
    }
}
