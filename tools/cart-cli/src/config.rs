//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cart_core::DEFAULT_CART_KEY;

/// Contents of `cart.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Product/stock API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Cart snapshot storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL serving `/products` and `/stock`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the snapshot, relative to the working directory.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Key the snapshot is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_dir() -> String {
    ".cart".to_string()
}

fn default_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            key: default_key(),
        }
    }
}

/// Generate a default `cart.toml`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Cart configuration

[api]
base_url = "{base_url}"
# timeout_secs = 10

[storage]
dir = "{dir}"
key = "{key}"
"#,
        base_url = default_base_url(),
        dir = default_dir(),
        key = default_key(),
    )
}
