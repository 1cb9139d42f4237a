use std::fmt::Debug;

use async_trait::async_trait;

use crate::models::{ImageDetail, ImageTagRef, Manifest};
use crate::uri::RepositoryAddress;
use crate::Result;

#[cfg(feature = "aws")]
pub mod ecr;
pub mod memory;

/// The remote registry operations this crate relies on. Implemented against
/// ecr for production use and in memory for unittesting.
#[async_trait]
pub trait RegistryApi: Send + Sync + Debug {
    /// ListImages: every (digest, tag) pair in the repository, at most `max_results`
    async fn list_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageTagRef>>;
    /// DescribeImages: one detail record per digest, at most `max_results`
    async fn describe_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageDetail>>;
    /// BatchGetImage: manifests of the images carrying any of `tags`
    async fn batch_get_image(
        &self,
        address: &RepositoryAddress,
        tags: &[&str],
    ) -> Result<Vec<Manifest>>;
    /// PutImage: publish `manifest` under `tag`, moving the tag if it exists
    async fn put_image(
        &self,
        address: &RepositoryAddress,
        manifest: &Manifest,
        tag: &str,
    ) -> Result<()>;
}
