//! Layered settings for the command-line interface
//!
//! Sources are merged in precedence order, later ones overriding earlier:
//! 1. Built-in defaults
//! 2. `rainbow-items.yaml` / `rainbow-items.toml` in the item directory
//! 3. Environment variables with the `RAINBOW_ITEMS_` prefix
//! 4. Command-line options

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use rainbow_items::{ItemsError, ResolverConfig, Result, DEFAULT_MAX_DERIVATION_DEPTH};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings file base name, looked up in the item directory.
pub const CONFIG_FILE_STEM: &str = "rainbow-items";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "RAINBOW_ITEMS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Template derivation ceiling
    pub max_depth: usize,
    /// File extensions treated as item documents, without the dot
    pub extensions: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DERIVATION_DEPTH,
            extensions: vec!["yml".to_string()],
        }
    }
}

impl CliConfig {
    /// Load settings for the item directory `root`.
    ///
    /// `max_depth` is the command-line override, applied last.
    pub fn load(root: &Path, max_depth: Option<usize>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(CliConfig::default()))
            .merge(Yaml::file(root.join(format!("{CONFIG_FILE_STEM}.yaml"))))
            .merge(Toml::file(root.join(format!("{CONFIG_FILE_STEM}.toml"))))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(max_depth) = max_depth {
            figment = figment.merge(Serialized::default("max_depth", max_depth));
        }

        let config: CliConfig = figment
            .extract()
            .map_err(|e| ItemsError::config(e.to_string()))?;
        config.validate()?;

        debug!(
            root = %root.display(),
            max_depth = config.max_depth,
            extensions = ?config.extensions,
            "loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ItemsError::config("no item document extensions configured"));
        }
        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_depth: self.max_depth,
        }
    }

    /// Whether a file with extension `ext` holds an item document.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
