//! Governor configuration
//!
//! Read from a TOML document with `[cache]`, `[resolver]` and `[affinity]`
//! tables. Every field is optional; missing values take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::affinity::{AffinityContext, AffinityStrategy};
use crate::cache::CacheConfig;
use crate::error::GovernorResult;
use crate::process::path::ResolverConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityConfig {
    pub strategy: AffinityStrategy,
    /// Override the detected logical processor count
    pub logical_processors: Option<usize>,
}

impl AffinityConfig {
    pub fn context(&self) -> GovernorResult<AffinityContext> {
        match self.logical_processors {
            Some(count) => AffinityContext::with_logical_processors(count),
            None => Ok(AffinityContext::detect()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Bounds of the executable path cache
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub affinity: AffinityConfig,
}

impl GovernorConfig {
    pub fn from_toml_str(content: &str) -> GovernorResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> GovernorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::info!("loading governor configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Check every section, normalizing values that are clamped rather than
    /// rejected
    pub fn validated(mut self) -> GovernorResult<Self> {
        self.cache = self.cache.validated()?;
        self.affinity.context()?;
        Ok(self)
    }
}
