//! Footprint engine
//!
//! Runs the pipeline for one request:
//! 1. Validate and normalize the raw input
//! 2. Compute the five categories, each through its routed provider
//! 3. Aggregate into a report
//!
//! Categories are independent. With `concurrent` enabled they are awaited
//! together, so remote calls overlap; a soft failure in one category never
//! affects another. A hard error in any category fails the whole request.

use crate::aggregate::aggregate;
use crate::calculator::compute_category;
use crate::config::{EngineConfig, ProviderKind};
use crate::error::FootprintError;
use crate::normalize::normalize;
use crate::provider::{EmissionFactorProvider, FactorTable, RemoteEstimationProvider, StaticTableProvider};
use crate::types::{AnnualizedInput, Category, CategoryResult, FootprintReport, LifestyleInput};
use futures::future::join_all;
use std::sync::Arc;

/// Footprint calculation pipeline
#[derive(Debug, Clone)]
pub struct FootprintEngine {
    transport: Arc<dyn EmissionFactorProvider>,
    flights: Arc<dyn EmissionFactorProvider>,
    electricity: Arc<dyn EmissionFactorProvider>,
    diet: Arc<dyn EmissionFactorProvider>,
    waste: Arc<dyn EmissionFactorProvider>,
    concurrent: bool,
}

impl FootprintEngine {
    /// Create engine using one provider for every category
    #[must_use]
    pub fn new(provider: Arc<dyn EmissionFactorProvider>) -> Self {
        Self {
            transport: Arc::clone(&provider),
            flights: Arc::clone(&provider),
            electricity: Arc::clone(&provider),
            diet: Arc::clone(&provider),
            waste: provider,
            concurrent: true,
        }
    }

    /// Build engine from configuration
    ///
    /// The static provider uses the configured factor file or the seed
    /// table. The remote provider is only constructed when routed to.
    pub fn from_config(config: &EngineConfig) -> Result<Self, FootprintError> {
        config.validate()?;

        let table = match &config.factors {
            Some(path) => FactorTable::from_file(path)?,
            None => FactorTable::seed(),
        };
        let static_provider: Arc<dyn EmissionFactorProvider> = Arc::new(StaticTableProvider::new(table));

        let remote_provider: Option<Arc<dyn EmissionFactorProvider>> =
            if config.routing.uses(ProviderKind::Remote) {
                let remote = RemoteEstimationProvider::from_settings(&config.remote)?;
                if !remote.has_credential() {
                    tracing::warn!(
                        env = %config.remote.api_key_env,
                        "no API key configured; remote categories will be reported as unavailable"
                    );
                }
                Some(Arc::new(remote))
            } else {
                None
            };

        let mut engine = Self::new(Arc::clone(&static_provider)).with_concurrency(config.concurrent);
        if let Some(remote) = remote_provider {
            for category in Category::ALL {
                if config.routing.provider_for(category) == ProviderKind::Remote {
                    engine = engine.with_provider(category, Arc::clone(&remote));
                }
            }
        }
        Ok(engine)
    }

    /// Route one category to `provider`
    #[must_use]
    pub fn with_provider(mut self, category: Category, provider: Arc<dyn EmissionFactorProvider>) -> Self {
        *self.slot_mut(category) = provider;
        self
    }

    /// With concurrency toggle
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Provider serving a category
    #[must_use]
    pub fn provider_for(&self, category: Category) -> &dyn EmissionFactorProvider {
        match category {
            Category::Transport => self.transport.as_ref(),
            Category::Flights => self.flights.as_ref(),
            Category::Electricity => self.electricity.as_ref(),
            Category::Diet => self.diet.as_ref(),
            Category::Waste => self.waste.as_ref(),
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Arc<dyn EmissionFactorProvider> {
        match category {
            Category::Transport => &mut self.transport,
            Category::Flights => &mut self.flights,
            Category::Electricity => &mut self.electricity,
            Category::Diet => &mut self.diet,
            Category::Waste => &mut self.waste,
        }
    }

    /// Calculate the footprint report for one input
    ///
    /// # Errors
    /// - [`FootprintError::InvalidInput`] before any category is computed
    /// - [`FootprintError::FactorNotFound`] when a static category has no
    ///   factor for the country; no partial report is returned
    pub async fn calculate(&self, input: &LifestyleInput) -> Result<FootprintReport, FootprintError> {
        input.validate()?;
        let annual = normalize(input);
        tracing::info!(
            country = %annual.country,
            vehicle = %annual.vehicle_type,
            concurrent = self.concurrent,
            "calculating footprint"
        );

        let results = self.compute_all(&annual).await.map_err(|e| {
            tracing::error!("footprint calculation failed: {e}");
            e
        })?;

        let report = aggregate(results);
        if report.any_degraded {
            tracing::warn!(
                total = report.total_tonnes,
                issues = report.issues().count(),
                "footprint report is degraded; total is a lower bound"
            );
        } else {
            tracing::info!(total = report.total_tonnes, "footprint calculated");
        }
        Ok(report)
    }

    async fn compute_all(&self, annual: &AnnualizedInput) -> Result<Vec<CategoryResult>, FootprintError> {
        if self.concurrent {
            return join_all(
                Category::ALL
                    .into_iter()
                    .map(|category| compute_category(category, annual, self.provider_for(category))),
            )
            .await
            .into_iter()
            .collect();
        }

        let mut results = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            results.push(compute_category(category, annual, self.provider_for(category)).await?);
        }
        Ok(results)
    }
}

impl Default for FootprintEngine {
    fn default() -> Self {
        Self::new(Arc::new(StaticTableProvider::seeded()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceProvider, VehicleType};

    fn scenario_input() -> LifestyleInput {
        LifestyleInput::new("India", VehicleType::Car)
            .with_daily_distance_km(10.0)
            .with_monthly_electricity_kwh(200.0)
            .with_meals_per_day(3)
            .with_weekly_waste_kg(5.0)
    }

    #[tokio::test]
    async fn india_scenario() {
        let engine = FootprintEngine::default();
        let report = engine.calculate(&scenario_input()).await.unwrap();

        assert_eq!(report.total_tonnes, 3.87);
        assert!(!report.any_degraded);
        assert_eq!(report.per_category.len(), 5);
        assert_eq!(report.category(Category::Flights).unwrap().annual_emission_tonnes, 0.0);
    }

    #[tokio::test]
    async fn sequential_matches_concurrent() {
        let concurrent = FootprintEngine::default();
        let sequential = FootprintEngine::default().with_concurrency(false);

        let a = concurrent.calculate(&scenario_input()).await.unwrap();
        let b = sequential.calculate(&scenario_input()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_normalization() {
        let engine = FootprintEngine::default();
        let input = LifestyleInput::new("", VehicleType::Bike);
        let err = engine.calculate(&input).await.unwrap_err();
        assert!(matches!(err, FootprintError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn from_default_config_is_all_static() {
        let engine = FootprintEngine::from_config(&EngineConfig::default()).unwrap();
        for category in Category::ALL {
            assert_eq!(engine.provider_for(category).source(), SourceProvider::Static);
        }
    }

    #[tokio::test]
    async fn from_config_routes_remote_categories() {
        let config = EngineConfig::new().with_route(Category::Electricity, ProviderKind::Remote);
        let engine = FootprintEngine::from_config(&config).unwrap();

        assert_eq!(engine.provider_for(Category::Electricity).source(), SourceProvider::Remote);
        assert_eq!(engine.provider_for(Category::Diet).source(), SourceProvider::Static);
    }
}
