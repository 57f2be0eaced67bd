//! Input normalization
//!
//! Converts period-scoped quantities into annual totals. Pure, never fails.

use crate::types::{AnnualizedInput, LifestyleInput};

/// Days per year
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Months per year
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Weeks per year
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Normalize raw input to annual totals
///
/// Negative quantities clamp to zero. Flights and home size are already
/// annual or static and pass through.
#[must_use]
pub fn normalize(raw: &LifestyleInput) -> AnnualizedInput {
    AnnualizedInput {
        country: raw.country.trim().to_string(),
        vehicle_type: raw.vehicle_type,
        annual_distance_km: clamp(raw.daily_distance_km) * DAYS_PER_YEAR,
        annual_electricity_kwh: clamp(raw.monthly_electricity_kwh) * MONTHS_PER_YEAR,
        annual_meals: clamp_count(raw.meals_per_day).saturating_mul(365),
        annual_waste_kg: clamp(raw.weekly_waste_kg) * WEEKS_PER_YEAR,
        flights_per_year: clamp_count(raw.flights_per_year),
        home_size_sqm: raw.home_size_sqm.map(clamp),
    }
}

#[inline]
fn clamp(value: f64) -> f64 {
    // NaN also maps to zero
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

#[inline]
fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
