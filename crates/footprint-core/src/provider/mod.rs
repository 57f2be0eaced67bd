//! Emission factor providers
//!
//! A provider turns an annualized activity quantity into annual emissions
//! for one category. Two implementations exist:
//! - [`StaticTableProvider`]: in-memory per-country factor table
//! - [`RemoteEstimationProvider`]: HTTP estimation service
//!
//! The calculator only sees the [`EmissionFactorProvider`] trait, so
//! providers can be mixed per category.

pub mod cache;
pub mod remote;
pub mod static_table;

pub use cache::{CacheStats, EstimateCache};
pub use remote::{activity_request, ActivityRequest, RemoteEstimationProvider};
pub use static_table::{FactorEntry, FactorScale, FactorTable, StaticTableProvider};

use crate::error::FootprintError;
use crate::types::{CategoryResult, EmissionFactorKey, SourceProvider};

/// Kilograms per tonne
pub const KG_PER_TONNE: f64 = 1000.0;

/// Source of per-category emissions
///
/// Hard errors ([`FootprintError::FactorNotFound`]) mean the request
/// addresses an unsupported configuration and abort the calculation.
/// Soft provider failures are returned as degraded results instead.
#[async_trait::async_trait]
pub trait EmissionFactorProvider: Send + Sync + std::fmt::Debug {
    /// Provider kind, reported on every result
    fn source(&self) -> SourceProvider;

    /// Resolve annual emissions for `annualized_quantity` units of activity
    async fn resolve(
        &self,
        key: &EmissionFactorKey,
        annualized_quantity: f64,
    ) -> Result<CategoryResult, FootprintError>;
}
