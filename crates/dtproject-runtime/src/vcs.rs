use crate::process::{run, CommandOutput};
use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;

/// Placeholder for values that are not defined (no commits, no tag, no remote).
pub const NOT_DEFINED: &str = "ND";

/// Suffix of files the index counters ignore.
const IGNORED_SUFFIX: &str = ".resolved";

/// Repository state of a project working copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Last segment of the origin URL, if a remote is configured.
    pub name: Option<String>,
    pub sha: String,
    /// Current branch, `HEAD` when detached.
    pub branch: String,
    pub detached: bool,
    /// Tag pointing exactly at HEAD, or `ND`.
    pub head_version: String,
    /// Most recent reachable tag, or `ND`.
    pub closest_version: String,
    pub origin_url: String,
    pub page_url: Option<String>,
    pub index_modified: usize,
    pub index_added: usize,
}

pub trait VcsClient: Send + Sync {
    fn name(&self) -> &str;

    fn repository_info(&self, path: &Path) -> Result<RepositoryInfo, RuntimeError>;
}

/// [`VcsClient`] backed by the `git` command line.
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_owned(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn git(&self, path: &Path, args: &[&str]) -> Result<CommandOutput, RuntimeError> {
        let mut full: Vec<&OsStr> = vec![OsStr::new("-C"), path.as_os_str()];
        full.extend(args.iter().map(OsStr::new));
        run(&self.program, full)
    }

    fn sha(&self, path: &Path) -> Result<String, RuntimeError> {
        let out = self.git(path, &["rev-parse", "HEAD"])?;
        match out.code {
            Some(0) => Ok(out.first_line().unwrap_or(NOT_DEFINED).to_owned()),
            // no commits yet
            Some(128) => Ok(NOT_DEFINED.to_owned()),
            _ => Err(out.into_failure()),
        }
    }

    fn branch(&self, path: &Path) -> Result<String, RuntimeError> {
        let out = self.git(path, &["branch", "--show-current"])?;
        if !out.success() {
            return Err(out.into_failure());
        }
        Ok(out.first_line().unwrap_or("HEAD").to_owned())
    }

    fn tag_or_nd(&self, path: &Path, args: &[&str]) -> Result<String, RuntimeError> {
        let out = self.git(path, args)?;
        Ok(if out.success() {
            out.first_line().unwrap_or(NOT_DEFINED).to_owned()
        } else {
            NOT_DEFINED.to_owned()
        })
    }

    fn origin_url(&self, path: &Path) -> Result<Option<String>, RuntimeError> {
        let out = self.git(path, &["config", "--get", "remote.origin.url"])?;
        match out.code {
            Some(0) => Ok(out.first_line().map(str::to_owned)),
            Some(1) => Ok(None),
            _ => Err(out.into_failure()),
        }
    }

    fn status_lines(&self, path: &Path, args: &[&str]) -> Result<Vec<String>, RuntimeError> {
        let mut full = vec!["status", "--porcelain"];
        full.extend_from_slice(args);
        let out = self.git(path, &full)?;
        if !out.success() {
            return Err(out.into_failure());
        }
        Ok(out.lines().into_iter().map(str::to_owned).collect())
    }
}

impl VcsClient for GitCli {
    fn name(&self) -> &'static str {
        "git"
    }

    fn repository_info(&self, path: &Path) -> Result<RepositoryInfo, RuntimeError> {
        debug!("reading repository info for {}", path.display());
        let sha = self.sha(path)?;
        let branch = self.branch(path)?;
        let head_version = if sha == NOT_DEFINED {
            NOT_DEFINED.to_owned()
        } else {
            self.tag_or_nd(path, &["describe", "--exact-match", "--tags", "HEAD"])?
        };
        let closest_version = self.tag_or_nd(path, &["describe", "--tags", "--abbrev=0"])?;
        let origin = self.origin_url(path)?;
        let modified = self.status_lines(path, &["--untracked-files=no"])?;
        let added = self.status_lines(path, &[])?;

        Ok(RepositoryInfo {
            name: origin.as_deref().and_then(repository_name),
            sha,
            detached: branch == "HEAD",
            branch,
            head_version,
            closest_version,
            page_url: origin.as_deref().map(git_remote_url_to_https),
            origin_url: origin.unwrap_or_else(|| NOT_DEFINED.to_owned()),
            index_modified: modified.len(),
            index_added: added
                .iter()
                .filter(|l| !l.ends_with(IGNORED_SUFFIX))
                .count(),
        })
    }
}

fn trim_remote(url: &str) -> &str {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url).trim_end_matches('/')
}

/// Repository name taken from the last path segment of a remote URL.
pub fn repository_name(url: &str) -> Option<String> {
    trim_remote(url)
        .rsplit(['/', ':'])
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Rewrite a remote URL into the https page of the repository.
///
/// `git@host:owner/repo.git` and `ssh://git@host/owner/repo` both become
/// `https://host/owner/repo`; https remotes only lose their `.git` suffix.
pub fn git_remote_url_to_https(url: &str) -> String {
    let url = trim_remote(url);
    if let Some(rest) = url.strip_prefix("ssh://") {
        let rest = rest.split_once('@').map_or(rest, |(_, r)| r);
        return format!("https://{rest}");
    }
    if let Some(rest) = url.strip_prefix("git@") {
        if let Some((host, repo)) = rest.split_once(':') {
            return format!("https://{host}/{repo}");
        }
    }
    if let Some(rest) = url.strip_prefix("http://") {
        return format!("https://{rest}");
    }
    url.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_urls_normalize_to_https() {
        assert_eq!(
            git_remote_url_to_https("git@github.com:org/project.git"),
            "https://github.com/org/project"
        );
        assert_eq!(
            git_remote_url_to_https("ssh://git@gitlab.com/org/project"),
            "https://gitlab.com/org/project"
        );
        assert_eq!(
            git_remote_url_to_https("https://github.com/org/project.git/"),
            "https://github.com/org/project"
        );
    }

    #[test]
    fn repository_name_is_last_segment() {
        assert_eq!(
            repository_name("https://github.com/org/Project.git").as_deref(),
            Some("Project")
        );
        assert_eq!(
            repository_name("git@github.com:project.git").as_deref(),
            Some("project")
        );
        assert_eq!(repository_name(""), None);
    }

    #[test]
    fn non_repository_directory_fails() {
        if !crate::process::command_exists("git") {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        assert!(GitCli::new().repository_info(dir.path()).is_err());
    }
}
