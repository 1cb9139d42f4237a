use crate::models::{Image, ImageDetail, ImageTagRef};
use crate::registry::Registry;
use crate::Result;

/// Build the catalog of tagged images in a repository, most recently pushed
/// first.
///
/// Tags are taken from `details` alone; `refs` is accepted for completeness
/// but is not merged into the result. Untagged images never appear and an
/// image with several tags yields a single entry listing all of them.
pub fn build_catalog(
    _refs: &[ImageTagRef],
    details: &[ImageDetail],
    repository_name: &str,
) -> Vec<Image> {
    let mut images: Vec<Image> = details
        .iter()
        .filter(|detail| !detail.tags.is_empty())
        .map(|detail| Image {
            digest: detail.digest.clone(),
            pushed_at: detail.pushed_at,
            repository_name: repository_name.to_string(),
            size: detail.size_bytes as f32,
            tags: detail.tags.clone(),
        })
        .collect();
    images.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    images
}

/// Query the registry for both listings and build the catalog from them
pub async fn fetch_catalog(registry: &Registry) -> Result<Vec<Image>> {
    let refs = registry.list_tagged_refs().await?;
    let details = registry.describe_images().await?;
    let images = build_catalog(&refs, &details, registry.repository_name());
    debug!(
        target: "registry",
        "catalog for {}: {} tagged of {} images",
        registry.repository_name(),
        images.len(),
        details.len()
    );
    Ok(images)
}
