use std::sync::Arc;

use crate::catalog;
use crate::client::RegistryApi;
use crate::config::ReleaseConfig;
use crate::models::Image;
use crate::registry::Registry;
use crate::release;
use crate::Result;

/// The two operations offered on the configured repository: reading the
/// catalog and releasing an image under the configured tag.
#[derive(Clone, Debug)]
pub struct ReleaseService {
    registry: Registry,
    target_tag: String,
}

impl ReleaseService {
    pub fn new(config: &ReleaseConfig, api: Arc<dyn RegistryApi>) -> Self {
        Self {
            registry: Registry::new(config.repository().clone(), api),
            target_tag: config.target_tag().to_string(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Tagged images in the repository, most recently pushed first
    pub async fn images(&self) -> Result<Vec<Image>> {
        catalog::fetch_catalog(&self.registry).await
    }

    /// Move the target tag onto the image tagged `source_tag`
    pub async fn release(&self, source_tag: &str) -> Result<()> {
        release::set_tag(&self.registry, &self.target_tag, source_tag).await
    }
}
