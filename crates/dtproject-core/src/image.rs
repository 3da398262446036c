//! Deterministic image references.
//!
//! Tags have the shape `registry/owner/name:version[-extra][-LOOP][-docs]-arch`.
//! Nothing here touches the filesystem or the container runtime.

use crate::CoreError;

/// Architectures images are published for.
pub const CANONICAL_ARCHS: [&str; 3] = ["amd64", "arm32v7", "arm64v8"];

static ARCH_ALIASES: &[(&str, &str)] = &[
    ("amd64", "amd64"),
    ("x86_64", "amd64"),
    ("x64", "amd64"),
    ("Intel 64", "amd64"),
    ("arm32v7", "arm32v7"),
    ("arm", "arm32v7"),
    ("armv7l", "arm32v7"),
    ("armhf", "arm32v7"),
    ("arm64v8", "arm64v8"),
    ("arm64", "arm64v8"),
    ("armv8", "arm64v8"),
    ("aarch64", "arm64v8"),
];

/// Map a host architecture name to its canonical form.
pub fn canonical_arch(arch: &str) -> Result<&'static str, CoreError> {
    ARCH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == arch)
        .map(|(_, canonical)| *canonical)
        .ok_or_else(|| CoreError::Usage(format!("unsupported architecture '{arch}'")))
}

pub fn assert_canonical_arch(arch: &str) -> Result<(), CoreError> {
    if CANONICAL_ARCHS.contains(&arch) {
        Ok(())
    } else {
        Err(CoreError::Usage(format!(
            "architecture '{arch}' is not canonical, expected one of: {}",
            CANONICAL_ARCHS.join(", ")
        )))
    }
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `-`.
pub fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Parameters of an image tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub arch: String,
    pub registry: String,
    pub owner: String,
    /// Defaults to the project's sanitized version name.
    pub version: Option<String>,
    pub loop_mode: bool,
    pub docs: bool,
    pub extra: Option<String>,
}

impl ImageSpec {
    pub fn new(arch: &str, registry: &str, owner: &str) -> Self {
        Self {
            arch: arch.to_owned(),
            registry: registry.to_owned(),
            owner: owner.to_owned(),
            version: None,
            loop_mode: false,
            docs: false,
            extra: None,
        }
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn loop_mode(mut self, enabled: bool) -> Self {
        self.loop_mode = enabled;
        self
    }

    #[must_use]
    pub fn docs(mut self, enabled: bool) -> Self {
        self.docs = enabled;
        self
    }

    #[must_use]
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Full tag for project `name`; `default_version` fills in a missing version.
    pub fn tag(&self, name: &str, default_version: &str) -> Result<String, CoreError> {
        assert_canonical_arch(&self.arch)?;
        let version = self.version.as_deref().unwrap_or(default_version);
        let extra = self
            .extra
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| format!("-{e}"))
            .unwrap_or_default();
        let loop_mode = if self.loop_mode { "-LOOP" } else { "" };
        let docs = if self.docs { "-docs" } else { "" };
        Ok(format!(
            "{}/{}/{name}:{version}{extra}{loop_mode}{docs}-{}",
            self.registry, self.owner, self.arch
        ))
    }
}

/// Release tag built from a repository head tag.
pub fn release_tag(
    name: &str,
    head_version: &str,
    arch: &str,
    registry: &str,
    owner: &str,
    docs: bool,
) -> Result<String, CoreError> {
    assert_canonical_arch(arch)?;
    let version = sanitize_version(head_version);
    let docs = if docs { "-docs" } else { "" };
    Ok(format!("{registry}/{owner}/{name}:{version}{docs}-{arch}"))
}

/// Multi-arch manifest reference, `registry/owner/name:version`.
pub fn manifest_tag(name: &str, registry: &str, owner: &str, version: &str) -> String {
    format!("{registry}/{owner}/{name}:{version}")
}
