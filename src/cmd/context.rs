use std::sync::Arc;

use cfg_if::cfg_if;
use release_tagger::client::RegistryApi;
use release_tagger::config::ReleaseConfig;
use release_tagger::service::ReleaseService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub struct Ctx {
    service: ReleaseService,
}

impl Ctx {
    /// Install logging and resolve the configured repository. A malformed
    /// repository uri fails here, before any registry call.
    pub async fn init(repository: &str, target_tag: &str) -> anyhow::Result<Self> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(filter))
            .try_init()?;
        let config = ReleaseConfig::from_uri(repository, Some(target_tag))?;
        let api = connect(&config).await?;
        Ok(Self {
            service: ReleaseService::new(&config, api),
        })
    }

    pub fn service(&self) -> &ReleaseService {
        &self.service
    }
}

async fn connect(config: &ReleaseConfig) -> anyhow::Result<Arc<dyn RegistryApi>> {
    cfg_if! {
        if #[cfg(feature = "aws")] {
            let region = config.repository().region();
            let api = release_tagger::client::ecr::EcrRegistryApi::new(region).await?;
            Ok(Arc::new(api))
        } else {
            anyhow::bail!("built without the aws feature, cannot reach {}", config.repository())
        }
    }
}
