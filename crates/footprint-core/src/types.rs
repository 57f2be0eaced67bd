//! Core types for the footprint engine
//!
//! Defines the request-scoped value objects flowing through the pipeline:
//! - Raw lifestyle input and its annualized form
//! - Report and factor categories
//! - Per-category results and the final report

use crate::error::{FootprintError, ProviderFailure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commute vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    /// Motorbike or scooter
    Bike,
    /// Private car
    Car,
    /// Public bus
    Bus,
}

impl VehicleType {
    /// All supported vehicles
    pub const ALL: [VehicleType; 3] = [VehicleType::Bike, VehicleType::Car, VehicleType::Bus];

    /// Factor category used to look up this vehicle
    #[inline]
    #[must_use]
    pub fn factor_category(self) -> FactorCategory {
        match self {
            VehicleType::Bike => FactorCategory::Bike,
            VehicleType::Car => FactorCategory::Car,
            VehicleType::Bus => FactorCategory::Bus,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleType::Bike => "Bike",
            VehicleType::Car => "Car",
            VehicleType::Bus => "Bus",
        };
        f.write_str(name)
    }
}

impl FromStr for VehicleType {
    type Err = FootprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bike" => Ok(VehicleType::Bike),
            "car" => Ok(VehicleType::Car),
            "bus" => Ok(VehicleType::Bus),
            other => Err(FootprintError::invalid_input(
                "vehicleType",
                format!("unknown vehicle type '{other}' (expected Bike, Car or Bus)"),
            )),
        }
    }
}

/// Report category, declared in the fixed report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Daily commute
    Transport,
    /// Air travel
    Flights,
    /// Household electricity
    Electricity,
    /// Food
    Diet,
    /// Household waste
    Waste,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 5] = [
        Category::Transport,
        Category::Flights,
        Category::Electricity,
        Category::Diet,
        Category::Waste,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Transport => "Transport",
            Category::Flights => "Flights",
            Category::Electricity => "Electricity",
            Category::Diet => "Diet",
            Category::Waste => "Waste",
        };
        f.write_str(name)
    }
}

/// Category an emission factor is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactorCategory {
    /// kg CO2e per km by bike
    Bike,
    /// kg CO2e per km by car
    Car,
    /// kg CO2e per km by bus
    Bus,
    /// kg CO2e per kWh
    Electricity,
    /// kg CO2e per meal
    Diet,
    /// kg CO2e per kg of waste
    Waste,
    /// kg CO2e per flight
    Flight,
}

impl FactorCategory {
    /// All factor categories
    pub const ALL: [FactorCategory; 7] = [
        FactorCategory::Bike,
        FactorCategory::Car,
        FactorCategory::Bus,
        FactorCategory::Electricity,
        FactorCategory::Diet,
        FactorCategory::Waste,
        FactorCategory::Flight,
    ];

    /// Report category this factor contributes to
    #[inline]
    #[must_use]
    pub fn report_category(self) -> Category {
        match self {
            FactorCategory::Bike | FactorCategory::Car | FactorCategory::Bus => Category::Transport,
            FactorCategory::Electricity => Category::Electricity,
            FactorCategory::Diet => Category::Diet,
            FactorCategory::Waste => Category::Waste,
            FactorCategory::Flight => Category::Flights,
        }
    }

    /// Unit of the stored factor when kilogram-scaled
    #[inline]
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            FactorCategory::Bike | FactorCategory::Car | FactorCategory::Bus => "kg CO2e/km",
            FactorCategory::Electricity => "kg CO2e/kWh",
            FactorCategory::Diet => "kg CO2e/meal",
            FactorCategory::Waste => "kg CO2e/kg waste",
            FactorCategory::Flight => "kg CO2e/flight",
        }
    }
}

impl fmt::Display for FactorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactorCategory::Bike => "Bike",
            FactorCategory::Car => "Car",
            FactorCategory::Bus => "Bus",
            FactorCategory::Electricity => "Electricity",
            FactorCategory::Diet => "Diet",
            FactorCategory::Waste => "Waste",
            FactorCategory::Flight => "Flight",
        };
        f.write_str(name)
    }
}

impl FromStr for FactorCategory {
    type Err = FootprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactorCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                FootprintError::invalid_input("category", format!("unknown factor category '{s}'"))
            })
    }
}

/// Lookup key into a factor source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmissionFactorKey {
    /// Country name as supplied by the caller
    pub country: String,
    /// Factor category
    pub category: FactorCategory,
}

impl EmissionFactorKey {
    /// Create new key
    #[inline]
    pub fn new(country: impl Into<String>, category: FactorCategory) -> Self {
        Self {
            country: country.into(),
            category,
        }
    }
}

/// Raw, self-reported lifestyle input
///
/// Integer counts are signed so that negative values from careless callers
/// can be represented and clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleInput {
    /// Country of residence
    pub country: String,
    /// Commute vehicle
    pub vehicle_type: VehicleType,
    /// Daily commute distance in km
    pub daily_distance_km: f64,
    /// Monthly electricity use in kWh
    pub monthly_electricity_kwh: f64,
    /// Meals per day
    pub meals_per_day: i64,
    /// Weekly waste in kg
    pub weekly_waste_kg: f64,
    /// Flights per year
    pub flights_per_year: i64,
    /// Home size in square meters (accepted, not used by the calculation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_size_sqm: Option<f64>,
}

impl LifestyleInput {
    /// Create input with all quantities at zero
    #[must_use]
    pub fn new(country: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            country: country.into(),
            vehicle_type,
            daily_distance_km: 0.0,
            monthly_electricity_kwh: 0.0,
            meals_per_day: 0,
            weekly_waste_kg: 0.0,
            flights_per_year: 0,
            home_size_sqm: None,
        }
    }

    /// With daily commute distance
    #[inline]
    #[must_use]
    pub fn with_daily_distance_km(mut self, km: f64) -> Self {
        self.daily_distance_km = km;
        self
    }

    /// With monthly electricity use
    #[inline]
    #[must_use]
    pub fn with_monthly_electricity_kwh(mut self, kwh: f64) -> Self {
        self.monthly_electricity_kwh = kwh;
        self
    }

    /// With meals per day
    #[inline]
    #[must_use]
    pub fn with_meals_per_day(mut self, meals: i64) -> Self {
        self.meals_per_day = meals;
        self
    }

    /// With weekly waste
    #[inline]
    #[must_use]
    pub fn with_weekly_waste_kg(mut self, kg: f64) -> Self {
        self.weekly_waste_kg = kg;
        self
    }

    /// With flights per year
    #[inline]
    #[must_use]
    pub fn with_flights_per_year(mut self, flights: i64) -> Self {
        self.flights_per_year = flights;
        self
    }

    /// With home size
    #[inline]
    #[must_use]
    pub fn with_home_size_sqm(mut self, sqm: f64) -> Self {
        self.home_size_sqm = Some(sqm);
        self
    }

    /// Parse a JSON payload
    ///
    /// Unknown vehicle types and missing required fields become
    /// [`FootprintError::InvalidInput`]; only `homeSizeSqm` may be omitted.
    pub fn from_json(payload: &str) -> Result<Self, FootprintError> {
        let input: Self = serde_json::from_str(payload)
            .map_err(|e| FootprintError::invalid_input("payload", e.to_string()))?;
        input.validate()?;
        Ok(input)
    }

    /// Reject values no clamping can repair
    ///
    /// Negative quantities are fine here; they are clamped during
    /// normalization. Non-finite numbers and a blank country are not.
    pub fn validate(&self) -> Result<(), FootprintError> {
        if self.country.trim().is_empty() {
            return Err(FootprintError::invalid_input("country", "must not be empty"));
        }

        let quantities = [
            ("dailyDistanceKm", self.daily_distance_km),
            ("monthlyElectricityKwh", self.monthly_electricity_kwh),
            ("weeklyWasteKg", self.weekly_waste_kg),
            ("homeSizeSqm", self.home_size_sqm.unwrap_or(0.0)),
        ];
        for (field, value) in quantities {
            if !value.is_finite() {
                return Err(FootprintError::invalid_input(field, "must be a finite number"));
            }
        }
        Ok(())
    }
}

/// Lifestyle input with every quantity expressed as an annual total
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualizedInput {
    /// Country of residence
    pub country: String,
    /// Commute vehicle
    pub vehicle_type: VehicleType,
    /// Commute distance per year in km
    pub annual_distance_km: f64,
    /// Electricity per year in kWh
    pub annual_electricity_kwh: f64,
    /// Meals per year
    pub annual_meals: u64,
    /// Waste per year in kg
    pub annual_waste_kg: f64,
    /// Flights per year
    pub flights_per_year: u64,
    /// Home size in square meters
    pub home_size_sqm: Option<f64>,
}

/// Which provider produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceProvider {
    /// In-memory factor table
    Static,
    /// Remote estimation service
    Remote,
}

/// Annual emissions for one report category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    /// Report category
    pub category: Category,
    /// Annual emissions in tonnes CO2e, full precision
    pub annual_emission_tonnes: f64,
    /// Provider that produced the value
    pub source_provider: SourceProvider,
    /// Set when a fallback value replaced the provider's answer
    pub degraded: bool,
    /// Condition surfaced by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<ProviderFailure>,
}

impl CategoryResult {
    /// Create a regular result
    #[inline]
    #[must_use]
    pub fn new(category: Category, annual_emission_tonnes: f64, source_provider: SourceProvider) -> Self {
        Self {
            category,
            annual_emission_tonnes: annual_emission_tonnes.max(0.0),
            source_provider,
            degraded: false,
            issue: None,
        }
    }

    /// Create a degraded result carrying the failure that caused it
    #[inline]
    #[must_use]
    pub fn degraded(
        category: Category,
        fallback_tonnes: f64,
        source_provider: SourceProvider,
        issue: ProviderFailure,
    ) -> Self {
        Self {
            category,
            annual_emission_tonnes: fallback_tonnes.max(0.0),
            source_provider,
            degraded: true,
            issue: Some(issue),
        }
    }
}

/// Final footprint report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintReport {
    /// Results in fixed category order
    pub per_category: Vec<CategoryResult>,
    /// Sum of all categories rounded to 2 decimals
    pub total_tonnes: f64,
    /// True when any category is degraded; the total is then a lower bound
    pub any_degraded: bool,
}

impl FootprintReport {
    /// Result for a single category
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.per_category.iter().find(|r| r.category == category)
    }

    /// Every provider condition surfaced during the calculation
    pub fn issues(&self) -> impl Iterator<Item = &ProviderFailure> {
        self.per_category.iter().filter_map(|r| r.issue.as_ref())
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for FootprintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.per_category {
            write!(
                f,
                "{}: {:.2} tonnes CO2 per year",
                result.category, result.annual_emission_tonnes
            )?;
            if result.degraded {
                f.write_str(" (estimate unavailable)")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Total: {:.2} tonnes CO2 per year", self.total_tonnes)?;
        if self.any_degraded {
            writeln!(
                f,
                "Warning: some categories could not be estimated; the total is a lower bound."
            )?;
            for issue in self.issues() {
                writeln!(f, "  - {issue}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_parses_case_insensitively() {
        assert_eq!("car".parse::<VehicleType>().unwrap(), VehicleType::Car);
        assert_eq!(" Bus ".parse::<VehicleType>().unwrap(), VehicleType::Bus);
    }

    #[test]
    fn unknown_vehicle_type_is_invalid_input() {
        let err = "Tram".parse::<VehicleType>().unwrap_err();
        assert!(matches!(err, FootprintError::InvalidInput { ref field, .. } if field == "vehicleType"));
    }

    #[test]
    fn category_order_matches_report_order() {
        let mut shuffled = vec![Category::Waste, Category::Transport, Category::Diet, Category::Flights];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Category::Transport, Category::Flights, Category::Diet, Category::Waste]
        );
    }

    #[test]
    fn vehicles_map_to_transport() {
        for vehicle in VehicleType::ALL {
            assert_eq!(vehicle.factor_category().report_category(), Category::Transport);
        }
        assert_eq!(FactorCategory::Flight.report_category(), Category::Flights);
    }

    #[test]
    fn lifestyle_input_from_json() {
        let input = LifestyleInput::from_json(
            r#"{"country":"India","vehicleType":"Car","dailyDistanceKm":10.0,"monthlyElectricityKwh":200,
                "mealsPerDay":3,"weeklyWasteKg":5,"flightsPerYear":0}"#,
        )
        .unwrap();
        assert_eq!(input.vehicle_type, VehicleType::Car);
        assert_eq!(input.meals_per_day, 3);
        assert_eq!(input.flights_per_year, 0);
        assert!(input.home_size_sqm.is_none());
    }

    #[test]
    fn lifestyle_input_rejects_missing_quantity() {
        let err = LifestyleInput::from_json(
            r#"{"country":"India","vehicleType":"Car","monthlyElectricityKwh":200,
                "mealsPerDay":3,"weeklyWasteKg":5,"flightsPerYear":0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FootprintError::InvalidInput { .. }));
        assert!(err.to_string().contains("dailyDistanceKm"));

        let bare = LifestyleInput::from_json(r#"{"country":"India","vehicleType":"Car"}"#);
        assert!(bare.is_err());
    }

    #[test]
    fn lifestyle_input_rejects_unknown_vehicle() {
        let err = LifestyleInput::from_json(r#"{"country":"India","vehicleType":"Rocket"}"#).unwrap_err();
        assert!(matches!(err, FootprintError::InvalidInput { .. }));
    }

    #[test]
    fn lifestyle_input_rejects_missing_country() {
        let err = LifestyleInput::from_json(r#"{"vehicleType":"Car"}"#).unwrap_err();
        assert!(matches!(err, FootprintError::InvalidInput { .. }));

        let blank = LifestyleInput::new("  ", VehicleType::Car);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn lifestyle_input_rejects_non_finite() {
        let input = LifestyleInput::new("India", VehicleType::Bike).with_daily_distance_km(f64::NAN);
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("dailyDistanceKm"));
    }

    #[test]
    fn negative_quantities_pass_validation() {
        let input = LifestyleInput::new("India", VehicleType::Bike).with_weekly_waste_kg(-3.0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn category_result_never_negative() {
        let result = CategoryResult::new(Category::Diet, -1.0, SourceProvider::Static);
        assert_eq!(result.annual_emission_tonnes, 0.0);
        assert!(!result.degraded);
    }
}
