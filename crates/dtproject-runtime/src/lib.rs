//! External collaborators used by dtproject.
//!
//! This crate wraps the tools the resolution core talks to but does not
//! implement itself: the version-control client (`VcsClient`, backed by the
//! `git` CLI), the container runtime (`ContainerClient`, backed by
//! `docker image inspect`), and the recipe repository client
//! (`RecipeClient`, backed by `git clone`/`git pull`). In-memory mocks of all
//! three live in [`mock`].

pub mod container;
pub mod mock;
pub mod process;
pub mod recipe;
pub mod vcs;

pub use container::{ContainerClient, DockerCli, ImageConfig, ImageInspection, RootFs};
pub use recipe::{GitRecipeClient, RecipeClient};
pub use vcs::{git_remote_url_to_https, GitCli, RepositoryInfo, VcsClient, NOT_DEFINED};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("'{0}' is not installed or not on PATH")]
    ToolUnavailable(String),
    #[error("command `{command}` failed (exit {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("no such image: {0}")]
    NoSuchImage(String),
    #[error("invalid output from `{command}`: {reason}")]
    InvalidOutput { command: String, reason: String },
    #[error("recipe repository has not been cloned at '{0}'")]
    NotCloned(PathBuf),
}
