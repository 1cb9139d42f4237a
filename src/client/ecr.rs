use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_ecr::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecr::operation::put_image::{PutImageError, PutImageOutput};
use aws_sdk_ecr::types::ImageIdentifier;
use chrono::{DateTime, Utc};
use snafu::OptionExt;

use super::RegistryApi;
use crate::error::{self, Error, Operation};
use crate::models::{ImageDetail, ImageTagRef, Manifest};
use crate::uri::RepositoryAddress;
use crate::Result;

/// Service error codes that mean the ambient credentials were rejected
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDeniedException",
    "ExpiredTokenException",
    "InvalidSignatureException",
    "UnrecognizedClientException",
];

/// Talks to a private ecr registry with the aws sdk, using the default
/// credential chain of the environment.
#[derive(Debug, Clone)]
pub struct EcrRegistryApi {
    client: aws_sdk_ecr::Client,
}

impl EcrRegistryApi {
    /// Load the ambient aws configuration for `region` and create a client.
    /// Credentials are resolved here so a missing identity fails at startup
    /// instead of on the first request.
    pub async fn new(region: &str) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        resolve_credentials(sdk_config.credentials_provider(), region).await?;
        debug!(target: "registry", "using private ecr in {}", region);
        Ok(Self::from_client(aws_sdk_ecr::Client::new(&sdk_config)))
    }

    pub fn from_client(client: aws_sdk_ecr::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistryApi for EcrRegistryApi {
    async fn list_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageTagRef>> {
        let output = self
            .client
            .list_images()
            .registry_id(address.registry_id())
            .repository_name(address.repository_name())
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| classify(e, Operation::ListImages, address))?;
        trace!(target: "registry", "list_images: {:?}", output);
        Ok(output.image_ids().iter().map(tag_ref).collect())
    }

    async fn describe_images(
        &self,
        address: &RepositoryAddress,
        max_results: i32,
    ) -> Result<Vec<ImageDetail>> {
        let output = self
            .client
            .describe_images()
            .registry_id(address.registry_id())
            .repository_name(address.repository_name())
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| classify(e, Operation::DescribeImages, address))?;
        trace!(target: "registry", "describe_images: {:?}", output);
        Ok(output.image_details().iter().map(detail).collect())
    }

    async fn batch_get_image(
        &self,
        address: &RepositoryAddress,
        tags: &[&str],
    ) -> Result<Vec<Manifest>> {
        let mut request = self
            .client
            .batch_get_image()
            .registry_id(address.registry_id())
            .repository_name(address.repository_name());
        for tag in tags {
            request = request.image_ids(ImageIdentifier::builder().image_tag(*tag).build());
        }
        let output = request
            .send()
            .await
            .map_err(|e| classify(e, Operation::BatchGetImage, address))?;
        for failure in output.failures() {
            debug!(
                target: "registry",
                "batch_get_image failure in {}: {:?} {}",
                address.repository_name(),
                failure.failure_code(),
                failure.failure_reason().unwrap_or_default()
            );
        }
        Ok(output
            .images()
            .iter()
            .filter_map(|image| image.image_manifest())
            .map(Manifest::new)
            .collect())
    }

    async fn put_image(
        &self,
        address: &RepositoryAddress,
        manifest: &Manifest,
        tag: &str,
    ) -> Result<()> {
        let response = self
            .client
            .put_image()
            .registry_id(address.registry_id())
            .repository_name(address.repository_name())
            .image_manifest(manifest.as_str())
            .image_tag(tag)
            .send()
            .await;
        put_image_outcome(response, address, tag)
    }
}

/// Resolve credentials once from `provider`, failing with `Authorization`
/// when the chain yields none.
async fn resolve_credentials(
    provider: Option<SharedCredentialsProvider>,
    region: &str,
) -> Result<()> {
    let provider = provider.context(error::AuthorizationSnafu {
        region,
        reason: "no credentials provider is configured",
    })?;
    match provider.provide_credentials().await {
        Ok(_) => Ok(()),
        Err(e) => {
            let reason = DisplayErrorContext(&e).to_string();
            error!(target: "registry", "resolving credentials: {}", reason);
            error::AuthorizationSnafu { region, reason }.fail()
        }
    }
}

fn put_image_outcome<R>(
    response: std::result::Result<PutImageOutput, SdkError<PutImageError, R>>,
    address: &RepositoryAddress,
    tag: &str,
) -> Result<()>
where
    R: Debug + 'static,
{
    match response {
        Ok(output) => {
            trace!(target: "registry", "put_image: {:?}", output);
            Ok(())
        }
        // The tag already points at this manifest
        Err(e) if e.code() == Some("ImageAlreadyExistsException") => {
            debug!(target: "registry", "tag '{}' is already on the requested image", tag);
            Ok(())
        }
        Err(e) => Err(classify(e, Operation::PutImage, address)),
    }
}

/// True when a credentials failure appears anywhere in the source chain
fn caused_by_credentials(err: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(err), |e| e.source()).any(|e| e.is::<CredentialsError>())
}

/// Sort an sdk failure into the crate error taxonomy
fn classify<E, R>(err: SdkError<E, R>, operation: Operation, address: &RepositoryAddress) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug + 'static,
{
    let reason = DisplayErrorContext(&err).to_string();
    let code = err.code().unwrap_or_default();
    if code == "RepositoryNotFoundException" {
        Error::RepositoryNotFound {
            operation,
            registry_id: address.registry_id().to_string(),
            repository: address.repository_name().to_string(),
        }
    } else if AUTH_ERROR_CODES.contains(&code) || caused_by_credentials(&err) {
        error!(target: "registry", "{}: {}", operation, reason);
        Error::Authorization {
            region: address.region().to_string(),
            reason,
        }
    } else {
        Error::Remote {
            operation,
            repository: address.repository_name().to_string(),
            reason,
        }
    }
}

fn tag_ref(id: &ImageIdentifier) -> ImageTagRef {
    ImageTagRef {
        digest: id.image_digest().unwrap_or_default().to_string(),
        tag: id.image_tag().map(str::to_string),
    }
}

fn detail(detail: &aws_sdk_ecr::types::ImageDetail) -> ImageDetail {
    ImageDetail {
        digest: detail.image_digest().unwrap_or_default().to_string(),
        pushed_at: detail
            .image_pushed_at()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
            .unwrap_or_default(),
        size_bytes: detail.image_size_in_bytes().unwrap_or_default(),
        tags: detail.image_tags().to_vec(),
    }
}
