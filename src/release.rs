use snafu::OptionExt;

use crate::registry::Registry;
use crate::{error, Result};

/// Point `target_tag` at the image currently tagged `source_tag`.
///
/// The source manifest is resolved first and then republished under the
/// target tag. Nothing is written until the final publish, so a failure at
/// either step leaves the repository as it was.
pub async fn set_tag(registry: &Registry, target_tag: &str, source_tag: &str) -> Result<()> {
    let manifests = registry.fetch_manifests(source_tag).await?;
    // A tag names one image, take the first if the registry returns more
    let manifest = manifests
        .into_iter()
        .next()
        .context(error::ImageNotFoundSnafu {
            repository: registry.repository_name(),
            tag: source_tag,
        })?;
    debug!(target: "release", "resolved manifest for '{}'", source_tag);
    registry.publish_tag(&manifest, target_tag).await?;
    info!(
        target: "release",
        "tagged image '{}' as '{}' in {}",
        source_tag,
        target_tag,
        registry.repository_name()
    );
    Ok(())
}
