//! Category emission calculator
//!
//! Picks the activity quantity for a report category and delegates the
//! factor resolution to a provider. No caching, no retries.

use crate::error::FootprintError;
use crate::provider::EmissionFactorProvider;
use crate::types::{AnnualizedInput, Category, CategoryResult, EmissionFactorKey, FactorCategory};

/// Factor category and annual quantity feeding a report category
///
/// Flights use a flat per-flight factor, so their quantity is the flight
/// count rather than a distance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn activity_for(category: Category, input: &AnnualizedInput) -> (FactorCategory, f64) {
    match category {
        Category::Transport => (input.vehicle_type.factor_category(), input.annual_distance_km),
        Category::Flights => (FactorCategory::Flight, input.flights_per_year as f64),
        Category::Electricity => (FactorCategory::Electricity, input.annual_electricity_kwh),
        Category::Diet => (FactorCategory::Diet, input.annual_meals as f64),
        Category::Waste => (FactorCategory::Waste, input.annual_waste_kg),
    }
}

/// Compute annual emissions for one category
///
/// A [`FootprintError::FactorNotFound`] from the provider propagates
/// unchanged; degraded results pass through as returned.
pub async fn compute_category(
    category: Category,
    input: &AnnualizedInput,
    provider: &dyn EmissionFactorProvider,
) -> Result<CategoryResult, FootprintError> {
    let (factor_category, quantity) = activity_for(category, input);
    let key = EmissionFactorKey::new(input.country.clone(), factor_category);

    let mut result = provider.resolve(&key, quantity).await?;
    result.category = category;
    Ok(result)
}
