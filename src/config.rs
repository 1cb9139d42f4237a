use std::str::FromStr;

use derive_builder::Builder;
use snafu::ResultExt;

use crate::error;
use crate::uri::RepositoryAddress;

/// Tag moved by a release when none is configured
pub const DEFAULT_TARGET_TAG: &str = "release";

/// Settings read once at startup and handed to [`crate::service::ReleaseService`]
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ReleaseConfig {
    /// Repository whose images are listed and tagged
    repository: RepositoryAddress,
    /// Tag moved onto the selected image
    #[builder(default = "DEFAULT_TARGET_TAG.to_string()")]
    target_tag: String,
}

impl ReleaseConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.target_tag.as_deref() {
            Some("") => Err("target tag must not be empty".to_string()),
            _ => Ok(()),
        }
    }
}

impl ReleaseConfig {
    /// Locate the repository from its uri, failing before any registry call
    /// is made when the uri is malformed.
    pub fn from_uri(uri: &str, target_tag: Option<&str>) -> crate::Result<Self> {
        let mut builder = ReleaseConfigBuilder::default();
        builder.repository(RepositoryAddress::from_str(uri)?);
        if let Some(tag) = target_tag {
            builder.target_tag(tag);
        }
        builder.build().context(error::ConfigSnafu)
    }

    pub fn repository(&self) -> &RepositoryAddress {
        &self.repository
    }

    pub fn target_tag(&self) -> &str {
        &self.target_tag
    }
}
