use std::fmt;

use snafu::Snafu;

use crate::config::ReleaseConfigBuilderError;

/// Remote registry operations, used to give errors enough context to be
/// diagnosed without a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListImages,
    DescribeImages,
    BatchGetImage,
    PutImage,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListImages => f.write_str("list images"),
            Self::DescribeImages => f.write_str("describe images"),
            Self::BatchGetImage => f.write_str("fetch image"),
            Self::PutImage => f.write_str("put image"),
        }
    }
}

/// Broad classes of failure, used by callers that need to decide how to
/// surface an error rather than what it says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authorization,
    NotFound,
    Remote,
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to authorize with aws in region {region}: {reason}"))]
    Authorization { region: String, reason: String },
    #[snafu(display("invalid release configuration: {source}"))]
    Config { source: ReleaseConfigBuilderError },
    #[snafu(display("no image tagged '{tag}' exists in repository {repository}"))]
    ImageNotFound { repository: String, tag: String },
    #[snafu(display("malformed repository uri '{uri}': {reason}"))]
    MalformedUri { uri: String, reason: String },
    #[snafu(display("failed to {operation} in repository {repository}: {reason}"))]
    Remote {
        operation: Operation,
        repository: String,
        reason: String,
    },
    #[snafu(display(
        "failed to {operation}: repository {repository} does not exist in registry {registry_id}"
    ))]
    RepositoryNotFound {
        operation: Operation,
        registry_id: String,
        repository: String,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::MalformedUri { .. } => ErrorKind::Configuration,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::ImageNotFound { .. } | Self::RepositoryNotFound { .. } => ErrorKind::NotFound,
            Self::Remote { .. } => ErrorKind::Remote,
        }
    }
}
