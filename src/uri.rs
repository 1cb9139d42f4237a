use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

use snafu::{ensure, OptionExt};

use crate::error;

/// Addressing information for a single repository in a private ecr registry,
/// derived from a uri such as
/// `000000000000.dkr.ecr.ap-northeast-1.amazonaws.com/repository1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryAddress {
    /// Account id that owns the registry
    registry_id: String,
    /// Repository inside the registry
    repository_name: String,
    /// Aws region hosting the registry
    region: String,
}

impl RepositoryAddress {
    pub fn new(registry_id: &str, repository_name: &str, region: &str) -> Self {
        Self {
            registry_id: registry_id.to_string(),
            repository_name: repository_name.to_string(),
            region: region.to_string(),
        }
    }

    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl FromStr for RepositoryAddress {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, path) = s.split_once('/').context(error::MalformedUriSnafu {
            uri: s,
            reason: "no repository was provided after the registry host",
        })?;
        let host_parts: Vec<_> = host.split('.').collect();
        ensure!(
            host_parts.len() >= 4,
            error::MalformedUriSnafu {
                uri: s,
                reason: "registry host must look like <registry id>.dkr.ecr.<region>.amazonaws.com",
            }
        );
        // Only the first path segment names the repository
        let repository_name = path.split('/').next().unwrap_or_default();
        let (registry_id, region) = (host_parts[0], host_parts[3]);
        ensure!(
            !registry_id.is_empty(),
            error::MalformedUriSnafu {
                uri: s,
                reason: "registry id is empty",
            }
        );
        ensure!(
            !region.is_empty(),
            error::MalformedUriSnafu {
                uri: s,
                reason: "region is empty",
            }
        );
        ensure!(
            !repository_name.is_empty(),
            error::MalformedUriSnafu {
                uri: s,
                reason: "repository name is empty",
            }
        );
        Ok(Self::new(registry_id, repository_name, region))
    }
}

impl fmt::Display for RepositoryAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}.dkr.ecr.{}.amazonaws.com/{}",
            self.registry_id, self.region, self.repository_name
        ))
    }
}
