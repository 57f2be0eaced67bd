//! Error types for the footprint engine
//!
//! Two families of failure exist:
//! - [`FootprintError`]: fatal, aborts the whole calculation
//! - [`ProviderFailure`]: soft, recovered per category by substituting a
//!   fallback value and flagging the result as degraded

use crate::types::FactorCategory;
use serde::Serialize;

/// Fatal engine error
#[derive(Debug, thiserror::Error)]
pub enum FootprintError {
    /// A required field is missing or out of domain
    #[error("invalid input: {field}: {reason}")]
    InvalidInput {
        /// Offending field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Static table has no entry for the requested pair
    #[error("no emission factor for {category} in country '{country}'")]
    FactorNotFound {
        /// Country as requested by the caller
        country: String,
        /// Category that could not be resolved
        category: FactorCategory,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a configuration or input file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FootprintError {
    /// Create an invalid input error
    #[inline]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a factor lookup error
    #[inline]
    pub fn factor_not_found(country: impl Into<String>, category: FactorCategory) -> Self {
        Self::FactorNotFound {
            country: country.into(),
            category,
        }
    }

    /// Check if the error was caused by the request rather than the setup
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::FactorNotFound { .. })
    }
}

impl From<toml::de::Error> for FootprintError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Soft failure of the remote estimation provider
///
/// Never escalated: the affected category reports a fallback value with
/// `degraded = true` and carries this condition for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind")]
pub enum ProviderFailure {
    /// Credential missing or still the placeholder; no call was attempted
    #[error("estimate for {category} unavailable: {reason}")]
    ProviderUnavailable {
        /// Affected category
        category: FactorCategory,
        /// Human-readable reason
        reason: String,
    },

    /// Non-2xx status or a payload without a usable CO2e value
    #[error("invalid estimate response for {category}: {detail}")]
    ProviderResponseInvalid {
        /// Affected category
        category: FactorCategory,
        /// Status or parse detail
        detail: String,
    },

    /// Timeout, DNS, TLS or connection failure
    #[error("estimation service unreachable for {category}: {detail}")]
    ProviderUnreachable {
        /// Affected category
        category: FactorCategory,
        /// Transport error detail
        detail: String,
    },
}

impl ProviderFailure {
    /// Category the failure applies to
    #[inline]
    #[must_use]
    pub fn category(&self) -> FactorCategory {
        match self {
            Self::ProviderUnavailable { category, .. }
            | Self::ProviderResponseInvalid { category, .. }
            | Self::ProviderUnreachable { category, .. } => *category,
        }
    }

    /// Stable short name of the failure kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => "ProviderUnavailable",
            Self::ProviderResponseInvalid { .. } => "ProviderResponseInvalid",
            Self::ProviderUnreachable { .. } => "ProviderUnreachable",
        }
    }

    /// Check if re-running the pipeline later could succeed without a config change
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnreachable { .. })
    }
}
