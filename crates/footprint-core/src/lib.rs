//! Footprint Core - Emission Factor Resolution & Aggregation Engine
//!
//! Estimates an annual personal carbon footprint from lifestyle inputs:
//! - Normalizes daily, weekly and monthly quantities to annual totals
//! - Resolves emissions per category from a static factor table or a
//!   remote estimation service
//! - Aggregates categories into a rounded total, flagging degraded results
//!
//! # Example
//!
//! ```rust,ignore
//! use footprint_core::{FootprintEngine, LifestyleInput, VehicleType};
//!
//! # async fn example() -> Result<(), footprint_core::FootprintError> {
//! let engine = FootprintEngine::default();
//!
//! let input = LifestyleInput::new("India", VehicleType::Car)
//!     .with_daily_distance_km(10.0)
//!     .with_monthly_electricity_kwh(200.0);
//! let report = engine.calculate(&input).await?;
//!
//! println!("Total: {} tonnes CO2e", report.total_tonnes);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod aggregate;
pub mod calculator;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod types;

// Re-exports for convenience
pub use aggregate::{aggregate, round2};
pub use calculator::{activity_for, compute_category};
pub use config::{EngineConfig, ProviderKind, RemoteSettings, Routing};
pub use engine::FootprintEngine;
pub use error::{FootprintError, ProviderFailure};
pub use normalize::normalize;
pub use provider::{
    EmissionFactorProvider, EstimateCache, FactorEntry, FactorScale, FactorTable,
    RemoteEstimationProvider, StaticTableProvider,
};
pub use types::{
    AnnualizedInput, Category, CategoryResult, EmissionFactorKey, FactorCategory, FootprintReport,
    LifestyleInput, SourceProvider, VehicleType,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Footprint Core
    pub use crate::{
        Category, EmissionFactorProvider, EngineConfig, FootprintEngine, FootprintError,
        FootprintReport, LifestyleInput, StaticTableProvider, VehicleType,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn mixed_static_and_remote_flow() {
        // Remote without a key: electricity degrades, the rest stay exact
        let remote = RemoteEstimationProvider::new(
            "http://127.0.0.1:9/estimate",
            None,
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let engine = FootprintEngine::default().with_provider(Category::Electricity, Arc::new(remote));

        let input = LifestyleInput::new("India", VehicleType::Car)
            .with_daily_distance_km(10.0)
            .with_monthly_electricity_kwh(200.0)
            .with_meals_per_day(3)
            .with_weekly_waste_kg(5.0);
        let report = engine.calculate(&input).await.unwrap();

        assert!(report.any_degraded);
        let electricity = report.category(Category::Electricity).unwrap();
        assert!(electricity.degraded);
        assert_eq!(electricity.source_provider, SourceProvider::Remote);
        // 0.511 + 1.36875 + 0.026
        assert_eq!(report.total_tonnes, 1.91);
    }

    #[test]
    fn types_integration() {
        let annual = normalize(&LifestyleInput::new("UK", VehicleType::Bus).with_daily_distance_km(2.0));
        let (category, quantity) = activity_for(Category::Transport, &annual);

        assert_eq!(category, FactorCategory::Bus);
        assert_eq!(quantity, 730.0);
    }
}
