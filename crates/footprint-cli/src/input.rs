//! Lifestyle input from a payload file or command line flags

use anyhow::{Context, Result};
use clap::ArgMatches;
use footprint_core::{LifestyleInput, VehicleType};
use std::io::Read;
use std::path::{Path, PathBuf};

fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("reading payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Build the input for `calculate`
pub(crate) fn from_args(args: &ArgMatches) -> Result<LifestyleInput> {
    if let Some(path) = args.get_one::<PathBuf>("input") {
        return Ok(LifestyleInput::from_json(&read_payload(path)?)?);
    }

    let country = args
        .get_one::<String>("country")
        .context("either --input or --country is required")?;
    let vehicle: VehicleType = args
        .get_one::<String>("vehicle")
        .map_or(Ok(VehicleType::Car), |v| v.parse())?;

    let mut input = LifestyleInput::new(country.as_str(), vehicle)
        .with_daily_distance_km(args.get_one::<f64>("daily-distance-km").copied().unwrap_or_default())
        .with_monthly_electricity_kwh(args.get_one::<f64>("monthly-electricity-kwh").copied().unwrap_or_default())
        .with_meals_per_day(args.get_one::<i64>("meals-per-day").copied().unwrap_or_default())
        .with_weekly_waste_kg(args.get_one::<f64>("weekly-waste-kg").copied().unwrap_or_default())
        .with_flights_per_year(args.get_one::<i64>("flights-per-year").copied().unwrap_or_default());
    if let Some(sqm) = args.get_one::<f64>("home-size-sqm") {
        input = input.with_home_size_sqm(*sqm);
    }

    input.validate()?;
    Ok(input)
}
