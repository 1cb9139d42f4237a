use std::sync::Arc;

use snafu::ensure;

use crate::client::RegistryApi;
use crate::models::{ImageDetail, ImageTagRef, Manifest};
use crate::uri::RepositoryAddress;
use crate::{error, Result};

/// Upper bound on images requested per listing. Repositories are expected to
/// hold far fewer, so results are never paginated and anything beyond this is
/// silently left out.
pub const MAX_RESULTS: i32 = 1000;

/// Handle to a single repository in a registry. All remote calls made by the
/// catalog and release workflows go through here.
#[derive(Clone, Debug)]
pub struct Registry {
    /// Repository this handle is bound to
    address: RepositoryAddress,
    /// Remote api implementation
    api: Arc<dyn RegistryApi>,
}

impl Registry {
    pub fn new(address: RepositoryAddress, api: Arc<dyn RegistryApi>) -> Self {
        Self { address, api }
    }

    pub fn address(&self) -> &RepositoryAddress {
        &self.address
    }

    pub fn repository_name(&self) -> &str {
        self.address.repository_name()
    }

    /// Every (digest, tag) pair in the repository
    pub async fn list_tagged_refs(&self) -> Result<Vec<ImageTagRef>> {
        let refs = self.api.list_images(&self.address, MAX_RESULTS).await?;
        trace!(target: "registry", "list_tagged_refs: {} refs in {}", refs.len(), self.address);
        Ok(refs)
    }

    /// Detail records for every image in the repository, tagged or not
    pub async fn describe_images(&self) -> Result<Vec<ImageDetail>> {
        let details = self.api.describe_images(&self.address, MAX_RESULTS).await?;
        trace!(target: "registry", "describe_images: {} images in {}", details.len(), self.address);
        Ok(details)
    }

    /// Manifests of the images carrying `tag`. Lookups are always made for a
    /// single tag even though the remote call accepts several.
    pub async fn fetch_manifests(&self, tag: &str) -> Result<Vec<Manifest>> {
        let manifests = self.api.batch_get_image(&self.address, &[tag]).await?;
        trace!(target: "registry", "fetch_manifests: {} matches for '{}'", manifests.len(), tag);
        ensure!(
            !manifests.is_empty(),
            error::ImageNotFoundSnafu {
                repository: self.repository_name(),
                tag,
            }
        );
        Ok(manifests)
    }

    /// Publish `manifest` under `tag`. Publishing a manifest under a tag it
    /// already carries succeeds without change.
    pub async fn publish_tag(&self, manifest: &Manifest, tag: &str) -> Result<()> {
        self.api.put_image(&self.address, manifest, tag).await?;
        trace!(target: "registry", "publish_tag: '{}' in {}", tag, self.address);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::client::memory::{MemoryRegistryApi, StoredImageBuilder};
    use crate::error::{Error, ErrorKind};
    use crate::uri::RepositoryAddress;

    fn registry() -> super::Registry {
        let address = RepositoryAddress::new("000000000000", "repository1", "ap-northeast-1");
        let api = MemoryRegistryApi::new(&address).with_image(
            StoredImageBuilder::default()
                .digest("sha256:d1")
                .manifest("manifest-1")
                .pushed_at(Utc.with_ymd_and_hms(2022, 9, 2, 5, 27, 2).unwrap())
                .tags(vec!["latest".to_string()])
                .build()
                .unwrap(),
        );
        super::Registry::new(address, Arc::new(api))
    }

    #[tokio::test]
    async fn test_fetch_manifests() {
        let manifests = registry().fetch_manifests("latest").await.unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].as_str(), "manifest-1");
    }

    #[tokio::test]
    async fn test_fetch_manifests_missing_tag() {
        let err = registry().fetch_manifests("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err, Error::ImageNotFound { ref tag, .. } if tag == "missing"));
    }
}
