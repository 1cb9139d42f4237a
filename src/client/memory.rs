use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use parking_lot::Mutex;
use snafu::ensure;

use super::RegistryApi;
use crate::error::{self, Operation};
use crate::models::{ImageDetail, ImageTagRef, Manifest};
use crate::registry::MAX_RESULTS;
use crate::uri::RepositoryAddress;
use crate::Result;

/// An image held by [`MemoryRegistryApi`]
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct StoredImage {
    digest: String,
    manifest: Manifest,
    pushed_at: DateTime<Utc>,
    #[builder(default)]
    size_bytes: i64,
    #[builder(default)]
    tags: Vec<String>,
}

/// In memory stand-in for a single ecr repository. Every call is checked
/// against the repository it was created for and the parameters this crate
/// is expected to send; anything else fails the way a rejected remote call
/// would.
#[derive(Debug)]
pub struct MemoryRegistryApi {
    address: RepositoryAddress,
    images: Mutex<Vec<StoredImage>>,
    published: Mutex<Vec<(Manifest, String)>>,
}

impl MemoryRegistryApi {
    pub fn new(address: &RepositoryAddress) -> Self {
        Self {
            address: address.clone(),
            images: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn with_image(self, image: StoredImage) -> Self {
        self.images.lock().push(image);
        self
    }

    /// Every (manifest, tag) pair received by `put_image`, in call order
    pub fn published(&self) -> Vec<(Manifest, String)> {
        self.published.lock().clone()
    }

    /// Digest currently carrying `tag`
    pub fn digest_for(&self, tag: &str) -> Option<String> {
        self.images
            .lock()
            .iter()
            .find(|image| image.tags.iter().any(|t| t == tag))
            .map(|image| image.digest.clone())
    }

    fn check_address(&self, operation: Operation, address: &RepositoryAddress) -> Result<()> {
        ensure!(
            address.registry_id() == self.address.registry_id(),
            error::RemoteSnafu {
                operation,
                repository: address.repository_name(),
                reason: format!("unexpected registry id {}", address.registry_id()),
            }
        );
        ensure!(
            address.repository_name() == self.address.repository_name(),
            error::RemoteSnafu {
                operation,
                repository: address.repository_name(),
                reason: "unexpected repository name",
            }
        );
        Ok(())
    }

    fn check_max_results(
        &self,
        operation: Operation,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<usize> {
        ensure!(
            max_results == MAX_RESULTS,
            error::RemoteSnafu {
                operation,
                repository: address.repository_name(),
                reason: format!("unexpected max results {max_results}"),
            }
        );
        Ok(max_results as usize)
    }
}

#[async_trait]
impl RegistryApi for MemoryRegistryApi {
    async fn list_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageTagRef>> {
        self.check_address(Operation::ListImages, address)?;
        let limit = self.check_max_results(Operation::ListImages, address, max_results)?;
        let images = self.images.lock();
        let refs = images.iter().flat_map(|image| {
            let tags: Vec<Option<String>> = if image.tags.is_empty() {
                vec![None]
            } else {
                image.tags.iter().cloned().map(Some).collect()
            };
            tags.into_iter().map(move |tag| ImageTagRef {
                digest: image.digest.clone(),
                tag,
            })
        });
        Ok(refs.take(limit).collect())
    }

    async fn describe_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageDetail>> {
        self.check_address(Operation::DescribeImages, address)?;
        let limit = self.check_max_results(Operation::DescribeImages, address, max_results)?;
        Ok(self
            .images
            .lock()
            .iter()
            .take(limit)
            .map(|image| ImageDetail {
                digest: image.digest.clone(),
                pushed_at: image.pushed_at,
                size_bytes: image.size_bytes,
                tags: image.tags.clone(),
            })
            .collect())
    }

    async fn batch_get_image(
        &self,
        address: &RepositoryAddress,
        tags: &[&str],
    ) -> Result<Vec<Manifest>> {
        self.check_address(Operation::BatchGetImage, address)?;
        ensure!(
            tags.len() == 1,
            error::RemoteSnafu {
                operation: Operation::BatchGetImage,
                repository: address.repository_name(),
                reason: format!("expected a single tag, got {}", tags.len()),
            }
        );
        Ok(self
            .images
            .lock()
            .iter()
            .filter(|image| image.tags.iter().any(|t| t == tags[0]))
            .map(|image| image.manifest.clone())
            .collect())
    }

    async fn put_image(
        &self,
        address: &RepositoryAddress,
        manifest: &Manifest,
        tag: &str,
    ) -> Result<()> {
        self.check_address(Operation::PutImage, address)?;
        let mut images = self.images.lock();
        let Some(target) = images.iter().position(|image| &image.manifest == manifest) else {
            return error::RemoteSnafu {
                operation: Operation::PutImage,
                repository: address.repository_name(),
                reason: "manifest does not match any image",
            }
            .fail();
        };
        for (index, image) in images.iter_mut().enumerate() {
            if index == target {
                if !image.tags.iter().any(|t| t == tag) {
                    image.tags.push(tag.to_string());
                }
            } else {
                image.tags.retain(|t| t != tag);
            }
        }
        self.published.lock().push((manifest.clone(), tag.to_string()));
        Ok(())
    }
}
