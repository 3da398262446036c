//! Remote image metadata lookups for dtproject.
//!
//! This crate provides the HTTP side of image inspection: an endpoint
//! configuration that expands a URL template from registry, organization,
//! repository and tag (`RemoteConfig`), and a `ureq` client that fetches the
//! JSON metadata document behind it (`HttpMetadataClient`).

pub mod config;
pub mod http;

pub use config::RemoteConfig;
pub use http::{HttpMetadataClient, MetadataClient};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("remote config error: {0}")]
    Config(String),
}
