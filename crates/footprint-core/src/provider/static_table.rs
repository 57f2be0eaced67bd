//! Static per-country emission factor table

use super::{EmissionFactorProvider, KG_PER_TONNE};
use crate::error::FootprintError;
use crate::types::{CategoryResult, EmissionFactorKey, FactorCategory, SourceProvider};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mass unit a factor is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorScale {
    /// kg CO2e per unit of activity
    #[default]
    Kilograms,
    /// tonnes CO2e per unit of activity
    Tonnes,
}

/// Single emission factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    /// CO2e per unit of activity
    pub value: f64,
    /// Mass unit of `value`
    #[serde(default)]
    pub scale: FactorScale,
}

impl FactorEntry {
    /// Kilogram-scaled factor
    #[inline]
    #[must_use]
    pub fn kg(value: f64) -> Self {
        Self {
            value,
            scale: FactorScale::Kilograms,
        }
    }

    /// Tonne-scaled factor
    #[inline]
    #[must_use]
    pub fn tonnes(value: f64) -> Self {
        Self {
            value,
            scale: FactorScale::Tonnes,
        }
    }

    /// Annual tonnes for the given quantity
    #[inline]
    #[must_use]
    pub fn tonnes_for(&self, quantity: f64) -> f64 {
        match self.scale {
            FactorScale::Kilograms => self.value * quantity / KG_PER_TONNE,
            FactorScale::Tonnes => self.value * quantity,
        }
    }
}

/// Accepts either a bare number (kg) or `{ value, scale }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Value(f64),
    Scaled(FactorEntry),
}

impl From<RawEntry> for FactorEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Value(v) => FactorEntry::kg(v),
            RawEntry::Scaled(entry) => entry,
        }
    }
}

/// Flat per-flight figure used by the seed data
pub const KG_PER_FLIGHT: f64 = 250.0;

/// Country to category to factor mapping
///
/// Read-only once built; owned by the provider it is injected into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorTable {
    countries: IndexMap<String, IndexMap<FactorCategory, FactorEntry>>,
}

impl FactorTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table covering India, USA, UK and Canada
    #[must_use]
    pub fn seed() -> Self {
        // Bike, Car, Bus, Electricity, Diet, Waste
        let rows: [(&str, [f64; 6]); 4] = [
            ("India", [0.05, 0.14, 0.03, 0.82, 1.25, 0.1]),
            ("USA", [0.03, 0.21, 0.04, 0.45, 2.0, 0.2]),
            ("UK", [0.02, 0.17, 0.05, 0.27, 1.8, 0.15]),
            ("Canada", [0.04, 0.20, 0.05, 0.6, 1.5, 0.12]),
        ];

        let mut table = Self::new();
        for (country, [bike, car, bus, electricity, diet, waste]) in rows {
            table = table
                .with_factor(country, FactorCategory::Bike, FactorEntry::kg(bike))
                .with_factor(country, FactorCategory::Car, FactorEntry::kg(car))
                .with_factor(country, FactorCategory::Bus, FactorEntry::kg(bus))
                .with_factor(country, FactorCategory::Electricity, FactorEntry::kg(electricity))
                .with_factor(country, FactorCategory::Diet, FactorEntry::kg(diet))
                .with_factor(country, FactorCategory::Waste, FactorEntry::kg(waste))
                .with_factor(country, FactorCategory::Flight, FactorEntry::kg(KG_PER_FLIGHT));
        }
        table
    }

    /// Add or replace a factor
    #[must_use]
    pub fn with_factor(
        mut self,
        country: impl Into<String>,
        category: FactorCategory,
        entry: FactorEntry,
    ) -> Self {
        self.countries
            .entry(country.into())
            .or_default()
            .insert(category, entry);
        self
    }

    /// Parse a table from TOML
    ///
    /// ```toml
    /// [India]
    /// Car = 0.14
    /// Flight = { value = 0.25, scale = "tonnes" }
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, FootprintError> {
        let raw: IndexMap<String, IndexMap<String, RawEntry>> = toml::from_str(source)?;

        let mut table = Self::new();
        for (country, entries) in raw {
            for (name, entry) in entries {
                let category: FactorCategory = name.parse().map_err(|_| {
                    FootprintError::Config(format!("unknown factor category '{name}' for {country}"))
                })?;
                let entry = FactorEntry::from(entry);
                if !entry.value.is_finite() || entry.value < 0.0 {
                    return Err(FootprintError::Config(format!(
                        "factor {category} for {country} must be a non-negative number, got {}",
                        entry.value
                    )));
                }
                table = table.with_factor(country.clone(), category, entry);
            }
        }
        Ok(table)
    }

    /// Load a table from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FootprintError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Look up a factor; country match ignores case and surrounding spaces
    #[must_use]
    pub fn get(&self, country: &str, category: FactorCategory) -> Option<&FactorEntry> {
        let wanted = country.trim();
        self.countries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .and_then(|(_, entries)| entries.get(&category))
    }

    /// Country names in insertion order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    /// Factors for a single country
    #[must_use]
    pub fn factors_for(&self, country: &str) -> Option<&IndexMap<FactorCategory, FactorEntry>> {
        let wanted = country.trim();
        self.countries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, entries)| entries)
    }

    /// Check if the country has any entry
    #[inline]
    #[must_use]
    pub fn supports(&self, country: &str) -> bool {
        self.factors_for(country).is_some()
    }
}

/// Provider backed by a [`FactorTable`]
#[derive(Debug, Clone)]
pub struct StaticTableProvider {
    table: FactorTable,
}

impl StaticTableProvider {
    /// Create provider owning `table`
    #[inline]
    #[must_use]
    pub fn new(table: FactorTable) -> Self {
        Self { table }
    }

    /// Provider over the built-in seed table
    #[inline]
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(FactorTable::seed())
    }

    /// Underlying table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &FactorTable {
        &self.table
    }

    /// Synchronous lookup shared by the async trait method
    pub fn resolve_now(
        &self,
        key: &EmissionFactorKey,
        annualized_quantity: f64,
    ) -> Result<CategoryResult, FootprintError> {
        let entry = self
            .table
            .get(&key.country, key.category)
            .ok_or_else(|| FootprintError::factor_not_found(key.country.clone(), key.category))?;

        let tonnes = entry.tonnes_for(annualized_quantity.max(0.0));
        tracing::debug!(
            country = %key.country,
            category = %key.category,
            factor = entry.value,
            quantity = annualized_quantity,
            tonnes,
            "resolved static factor"
        );

        Ok(CategoryResult::new(
            key.category.report_category(),
            tonnes,
            SourceProvider::Static,
        ))
    }
}

impl Default for StaticTableProvider {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait::async_trait]
impl EmissionFactorProvider for StaticTableProvider {
    fn source(&self) -> SourceProvider {
        SourceProvider::Static
    }

    async fn resolve(
        &self,
        key: &EmissionFactorKey,
        annualized_quantity: f64,
    ) -> Result<CategoryResult, FootprintError> {
        self.resolve_now(key, annualized_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn seed_covers_every_category_for_each_country() {
        let table = FactorTable::seed();
        let countries: Vec<_> = table.countries().collect();
        assert_eq!(countries, vec!["India", "USA", "UK", "Canada"]);

        for country in countries {
            for category in FactorCategory::ALL {
                assert!(
                    table.get(country, category).is_some(),
                    "missing {category} for {country}"
                );
            }
        }
    }

    #[test]
    fn seed_resolves_every_supported_pair() {
        let provider = StaticTableProvider::seeded();
        let countries: Vec<String> = provider.table().countries().map(str::to_string).collect();

        for country in &countries {
            for category in FactorCategory::ALL {
                let key = EmissionFactorKey::new(country.as_str(), category);
                let result = provider
                    .resolve_now(&key, 100.0)
                    .unwrap_or_else(|e| panic!("{country}/{category}: {e}"));

                assert!(result.annual_emission_tonnes >= 0.0, "{country}/{category}");
                assert_eq!(result.category, category.report_category());
                assert_eq!(result.source_provider, SourceProvider::Static);
                assert!(!result.degraded);
                assert!(result.issue.is_none());
            }
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let table = FactorTable::seed();
        assert_eq!(table.get("india", FactorCategory::Car), Some(&FactorEntry::kg(0.14)));
        assert!(table.supports(" usa "));
        assert!(!table.supports("Brazil"));
    }

    #[test]
    fn resolve_converts_kg_to_tonnes() {
        let provider = StaticTableProvider::seeded();
        let key = EmissionFactorKey::new("India", FactorCategory::Electricity);
        let result = provider.resolve_now(&key, 2400.0).unwrap();

        assert_eq!(result.category, Category::Electricity);
        assert!((result.annual_emission_tonnes - 1.968).abs() < 1e-9);
        assert_eq!(result.source_provider, SourceProvider::Static);
        assert!(!result.degraded);
    }

    #[test]
    fn resolve_keeps_tonne_scaled_factor() {
        let table = FactorTable::new().with_factor("Iceland", FactorCategory::Flight, FactorEntry::tonnes(0.3));
        let provider = StaticTableProvider::new(table);
        let key = EmissionFactorKey::new("Iceland", FactorCategory::Flight);

        let result = provider.resolve_now(&key, 4.0).unwrap();
        assert!((result.annual_emission_tonnes - 1.2).abs() < 1e-9);
        assert_eq!(result.category, Category::Flights);
    }

    #[test]
    fn unknown_country_is_factor_not_found() {
        let provider = StaticTableProvider::seeded();
        let key = EmissionFactorKey::new("Brazil", FactorCategory::Car);
        let err = provider.resolve_now(&key, 100.0).unwrap_err();
        assert!(matches!(
            err,
            FootprintError::FactorNotFound { ref country, category: FactorCategory::Car } if country == "Brazil"
        ));
    }

    #[test]
    fn unknown_category_is_factor_not_found() {
        let table = FactorTable::new().with_factor("India", FactorCategory::Car, FactorEntry::kg(0.14));
        let provider = StaticTableProvider::new(table);
        let key = EmissionFactorKey::new("India", FactorCategory::Diet);
        assert!(provider.resolve_now(&key, 10.0).is_err());
    }

    #[test]
    fn table_from_toml() {
        let table = FactorTable::from_toml_str(
            r#"
            [Norway]
            Car = 0.12
            Electricity = 0.02
            Flight = { value = 0.25, scale = "tonnes" }
            "#,
        )
        .unwrap();

        assert_eq!(table.get("Norway", FactorCategory::Car), Some(&FactorEntry::kg(0.12)));
        assert_eq!(
            table.get("Norway", FactorCategory::Flight),
            Some(&FactorEntry::tonnes(0.25))
        );
        assert!(table.get("Norway", FactorCategory::Bus).is_none());
    }

    #[test]
    fn table_from_toml_rejects_negative_factor() {
        let err = FactorTable::from_toml_str("[India]\nCar = -0.14\n").unwrap_err();
        assert!(matches!(err, FootprintError::Config(_)));
    }

    #[test]
    fn table_from_toml_rejects_unknown_category() {
        assert!(FactorTable::from_toml_str("[India]\nTrain = 0.01\n").is_err());
    }
}
