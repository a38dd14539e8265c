//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use cart_cache::FileStore;
use cart_core::{CartStore, HttpCatalog};
use cart_data::FetchClient;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched from the working directory upward.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// The store type every command works against.
pub type Store = CartStore<HttpCatalog, FileStore>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };
        tracing::debug!(base_url = %config.api.base_url, key = %config.storage.key, "config loaded");

        Ok(Self {
            config,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if !config_path.exists() {
                    continue;
                }
                match CliConfig::load(config_path.to_str()?) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "skipping config file")
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// HTTP client for the configured API.
    pub fn fetch_client(&self) -> FetchClient {
        let client = FetchClient::new(self.config.api.base_url.as_str());
        match self.config.api.timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        }
    }

    /// Open the cart, restoring its snapshot.
    pub fn open_store(&self) -> Result<Store> {
        let dir = self.resolve_path(&self.config.storage.dir);
        let files = FileStore::open(dir.clone())
            .with_context(|| format!("Failed to open cart storage: {}", dir.display()))?;
        let catalog = HttpCatalog::new(self.fetch_client());

        CartStore::open(catalog, files, self.config.storage.key.as_str())
            .context("Failed to load cart snapshot")
    }
}
