//! CLI bootstrap - the composition root for in-process commands.

use std::path::PathBuf;
use std::sync::Arc;

use anirent_service::{AnirentService, ServiceConfig, ServiceDeps};
use anyhow::{Context, Result};

/// Settings collected from global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Override for the in-progress download directory.
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Service configuration with the flag overrides applied.
    pub fn service_config(&self) -> ServiceConfig {
        let config = ServiceConfig::default();
        match &self.data_dir {
            Some(dir) => config.with_data_dir(dir.clone()),
            None => config,
        }
    }
}

/// Everything a command handler needs.
#[derive(Debug)]
pub struct CliContext {
    /// In-process service facade.
    pub service: Arc<AnirentService>,
    /// Configuration the service was built with.
    pub config: ServiceConfig,
}

/// Build the in-process service with the production adapters.
pub fn bootstrap(cli: &CliConfig) -> Result<CliContext> {
    let config = cli.service_config();
    let deps = ServiceDeps::from_config(&config).context("failed to build service adapters")?;
    let service = Arc::new(AnirentService::new(deps, &config));
    Ok(CliContext { service, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_override_is_applied() {
        let cli = CliConfig {
            data_dir: Some(PathBuf::from("/tmp/anirent-test")),
        };
        assert_eq!(
            cli.service_config().data_dir(),
            std::path::Path::new("/tmp/anirent-test")
        );
    }

    #[test]
    fn defaults_without_overrides() {
        let config = CliConfig::default().service_config();
        assert_eq!(config.data_dir(), ServiceConfig::default().data_dir());
    }
}
