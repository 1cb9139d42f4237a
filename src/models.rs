use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (digest, tag) pair as returned by the registry image listing.
/// An image carrying several tags shows up once per tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTagRef {
    pub digest: String,
    pub tag: Option<String>,
}

/// Metadata describing a single image digest in a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetail {
    pub digest: String,
    pub pushed_at: DateTime<Utc>,
    pub size_bytes: i64,
    /// Every tag currently pointing at this digest, may be empty
    pub tags: Vec<String>,
}

/// An image manifest. The contents are never interpreted, only handed back
/// to the registry when publishing a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(String);

impl Manifest {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Manifest {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Manifest {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tagged image as shown in the catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub digest: String,
    pub pushed_at: DateTime<Utc>,
    pub repository_name: String,
    /// Size in bytes. Stored as f32, so sizes above 2^24 bytes are rounded.
    pub size: f32,
    pub tags: Vec<String>,
}

/// Request body selecting the image to release by one of its current tags
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageTag {
    pub tag: String,
}

/// Error body returned by the http api
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorMessage {
    pub message: String,
}
