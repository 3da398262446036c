use crate::RemoteError;
use serde::{Deserialize, Serialize};

const PLACEHOLDERS: [&str; 4] = ["{registry}", "{organization}", "{repository}", "{tag}"];

/// Location of the remote metadata service.
///
/// `metadata_url` is a template; `{registry}`, `{organization}`,
/// `{repository}` and `{tag}` are substituted per image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    pub metadata_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl RemoteConfig {
    pub fn new(metadata_url: &str) -> Result<Self, RemoteError> {
        let metadata_url = metadata_url.trim().to_owned();
        if let Some(missing) = PLACEHOLDERS.iter().find(|p| !metadata_url.contains(**p)) {
            return Err(RemoteError::Config(format!(
                "metadata URL '{metadata_url}' is missing the {missing} placeholder"
            )));
        }
        Ok(Self {
            metadata_url,
            auth_token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_owned());
        self
    }

    pub fn image_metadata_url(
        &self,
        registry: &str,
        organization: &str,
        repository: &str,
        tag: &str,
    ) -> String {
        self.metadata_url
            .replace("{registry}", registry)
            .replace("{organization}", organization)
            .replace("{repository}", repository)
            .replace("{tag}", tag)
    }
}
