//! Testing utilities for the footprint workspace
//!
//! Shared fixtures and a scripted provider.

#![allow(missing_docs)]

use footprint_core::{
    CategoryResult, EmissionFactorKey, EmissionFactorProvider, FactorCategory, FootprintError,
    LifestyleInput, ProviderFailure, SourceProvider, VehicleType,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// India commuter from the reference scenario; totals 3.87 t on the seed table
pub fn india_commuter() -> LifestyleInput {
    LifestyleInput::new("India", VehicleType::Car)
        .with_daily_distance_km(10.0)
        .with_monthly_electricity_kwh(200.0)
        .with_meals_per_day(3)
        .with_weekly_waste_kg(5.0)
        .with_flights_per_year(0)
}

pub fn input_for_country(country: &str) -> LifestyleInput {
    LifestyleInput {
        country: country.to_string(),
        ..india_commuter()
    }
}

pub fn frequent_flyer() -> LifestyleInput {
    india_commuter().with_flights_per_year(6)
}

pub fn sample_payload() -> &'static str {
    r#"{
        "country": "India",
        "vehicleType": "Car",
        "dailyDistanceKm": 10.0,
        "monthlyElectricityKwh": 200.0,
        "mealsPerDay": 3,
        "weeklyWasteKg": 5.0,
        "flightsPerYear": 0,
        "homeSizeSqm": 50.0
    }"#
}

/// Scripted outcome for one factor category
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Report this many tonnes
    Tonnes(f64),
    /// Report a degraded zero with this failure
    Degraded(ProviderFailure),
    /// Fail with `FactorNotFound`
    NotFound,
}

/// Provider returning scripted outcomes and counting calls
#[derive(Debug)]
pub struct ScriptedProvider {
    source: SourceProvider,
    outcomes: HashMap<FactorCategory, Outcome>,
    default: Outcome,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(source: SourceProvider, default: Outcome) -> Self {
        Self {
            source,
            outcomes: HashMap::new(),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_outcome(mut self, category: FactorCategory, outcome: Outcome) -> Self {
        self.outcomes.insert(category, outcome);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmissionFactorProvider for ScriptedProvider {
    fn source(&self) -> SourceProvider {
        self.source
    }

    async fn resolve(
        &self,
        key: &EmissionFactorKey,
        _annualized_quantity: f64,
    ) -> Result<CategoryResult, FootprintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let category = key.category.report_category();
        match self.outcomes.get(&key.category).unwrap_or(&self.default) {
            Outcome::Tonnes(t) => Ok(CategoryResult::new(category, *t, self.source)),
            Outcome::Degraded(failure) => Ok(CategoryResult::degraded(
                category,
                0.0,
                self.source,
                failure.clone(),
            )),
            Outcome::NotFound => Err(FootprintError::factor_not_found(key.country.clone(), key.category)),
        }
    }
}

pub fn unreachable(category: FactorCategory) -> ProviderFailure {
    ProviderFailure::ProviderUnreachable {
        category,
        detail: "connection refused".to_string(),
    }
}
