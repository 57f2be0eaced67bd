//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration (all categories on the static table).
//!
//! ```toml
//! concurrent = true
//! factors = "factors.toml"
//!
//! [routing]
//! electricity = "remote"
//!
//! [remote]
//! endpoint = "https://beta4.api.climatiq.io/estimate"
//! api_key_env = "CLIMATIQ_API_KEY"
//! timeout_secs = 10
//! ```

use crate::error::FootprintError;
use crate::provider::remote::is_usable_credential;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default estimation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://beta4.api.climatiq.io/estimate";
/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "CLIMATIQ_API_KEY";

/// Which provider serves a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// In-memory factor table
    #[default]
    Static,
    /// Remote estimation service
    Remote,
}

/// Per-category provider routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Routing {
    /// Transport provider
    pub transport: ProviderKind,
    /// Flights provider
    pub flights: ProviderKind,
    /// Electricity provider
    pub electricity: ProviderKind,
    /// Diet provider
    pub diet: ProviderKind,
    /// Waste provider
    pub waste: ProviderKind,
}

impl Routing {
    /// Route every category to `kind`
    #[inline]
    #[must_use]
    pub fn all(kind: ProviderKind) -> Self {
        Self {
            transport: kind,
            flights: kind,
            electricity: kind,
            diet: kind,
            waste: kind,
        }
    }

    /// Provider kind for a category
    #[inline]
    #[must_use]
    pub fn provider_for(&self, category: Category) -> ProviderKind {
        match category {
            Category::Transport => self.transport,
            Category::Flights => self.flights,
            Category::Electricity => self.electricity,
            Category::Diet => self.diet,
            Category::Waste => self.waste,
        }
    }

    /// Set provider kind for a category
    #[inline]
    pub fn set(&mut self, category: Category, kind: ProviderKind) {
        let slot = match category {
            Category::Transport => &mut self.transport,
            Category::Flights => &mut self.flights,
            Category::Electricity => &mut self.electricity,
            Category::Diet => &mut self.diet,
            Category::Waste => &mut self.waste,
        };
        *slot = kind;
    }

    /// Check if any category uses the remote provider
    #[inline]
    #[must_use]
    pub fn uses(&self, kind: ProviderKind) -> bool {
        Category::ALL.iter().any(|c| self.provider_for(*c) == kind)
    }
}

/// Remote estimation service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Estimation endpoint URL
    pub endpoint: String,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    /// Inline API key; prefer the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Last-known-good cache capacity; zero disables the cache
    pub cache_capacity: u64,
    /// Cache entry lifetime in seconds
    pub cache_ttl_secs: Option<u64>,
}

impl RemoteSettings {
    /// Resolve the credential: inline key first, then the environment
    ///
    /// Blank values and the sample placeholder count as missing.
    #[must_use]
    pub fn resolve_credential(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| is_usable_credential(k))
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| is_usable_credential(k))
            })
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            timeout_secs: 10,
            cache_capacity: 1_000,
            cache_ttl_secs: Some(3_600),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Provider per category
    pub routing: Routing,
    /// Compute categories concurrently
    pub concurrent: bool,
    /// Remote provider settings
    pub remote: RemoteSettings,
    /// Custom factor table replacing the seed data
    pub factors: Option<PathBuf>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, FootprintError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// A relative `factors` path is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FootprintError> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        if let (Some(factors), Some(dir)) = (config.factors.as_ref(), path.parent()) {
            if factors.is_relative() {
                config.factors = Some(dir.join(factors));
            }
        }
        Ok(config)
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<(), FootprintError> {
        if self.routing.uses(ProviderKind::Remote) {
            if self.remote.endpoint.trim().is_empty() {
                return Err(FootprintError::Config("remote endpoint must not be empty".to_string()));
            }
            if self.remote.timeout_secs == 0 {
                return Err(FootprintError::Config("remote timeout must be positive".to_string()));
            }
        }
        Ok(())
    }

    /// With routing
    #[inline]
    #[must_use]
    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    /// With provider for one category
    #[inline]
    #[must_use]
    pub fn with_route(mut self, category: Category, kind: ProviderKind) -> Self {
        self.routing.set(category, kind);
        self
    }

    /// With concurrency toggle
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// With remote settings
    #[inline]
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteSettings) -> Self {
        self.remote = remote;
        self
    }

    /// With custom factor table file
    #[inline]
    #[must_use]
    pub fn with_factors(mut self, path: impl Into<PathBuf>) -> Self {
        self.factors = Some(path.into());
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            routing: Routing::default(),
            concurrent: true,
            remote: RemoteSettings::default(),
            factors: None,
        }
    }
}
