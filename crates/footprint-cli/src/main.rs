//! `footprint` command line tool
//!
//! Reads one lifestyle payload, runs the engine and prints the report.

mod input;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use footprint_core::{EngineConfig, FactorCategory, FactorEntry, FactorScale, FactorTable, FootprintEngine};
use std::fmt::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Engine configuration (TOML)")
}

fn number_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .default_value("0")
        .allow_negative_numbers(true)
        .help(help)
}

fn cli() -> Command {
    Command::new("footprint")
        .version(footprint_core::VERSION)
        .about("Personal carbon footprint estimator")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG is set"),
        )
        .subcommand(
            Command::new("calculate")
                .about("Estimate annual emissions for one lifestyle")
                .arg(config_arg())
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("country")
                        .help("Lifestyle JSON payload, or - for stdin"),
                )
                .arg(
                    Arg::new("country")
                        .long("country")
                        .required_unless_present("input")
                        .help("Country of residence"),
                )
                .arg(
                    Arg::new("vehicle")
                        .long("vehicle")
                        .default_value("car")
                        .help("Vehicle type: bike, car or bus"),
                )
                .arg(number_arg("daily-distance-km", "Distance travelled per day").value_parser(value_parser!(f64)))
                .arg(
                    number_arg("monthly-electricity-kwh", "Electricity used per month")
                        .value_parser(value_parser!(f64)),
                )
                .arg(number_arg("meals-per-day", "Meals eaten per day").value_parser(value_parser!(i64)))
                .arg(number_arg("weekly-waste-kg", "Waste produced per week").value_parser(value_parser!(f64)))
                .arg(number_arg("flights-per-year", "Flights taken per year").value_parser(value_parser!(i64)))
                .arg(
                    Arg::new("home-size-sqm")
                        .long("home-size-sqm")
                        .value_parser(value_parser!(f64))
                        .help("Home size; recorded but not used"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("factors")
                .about("List the static emission factor table")
                .arg(config_arg())
                .arg(Arg::new("country").long("country").help("Only show this country")),
        )
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> Result<EngineConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::from_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

async fn calculate(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let input = input::from_args(args)?;
    let engine = FootprintEngine::from_config(&config)?;

    let report = engine.calculate(&input).await?;
    if args.get_flag("json") {
        println!("{}", report.to_json_pretty()?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn describe(category: FactorCategory, entry: &FactorEntry) -> String {
    let per = category.unit().split_once('/').map_or("", |(_, per)| per);
    let mass = match entry.scale {
        FactorScale::Kilograms => "kg",
        FactorScale::Tonnes => "t",
    };
    format!("{} {mass} CO2e/{per}", entry.value)
}

fn render_table(table: &FactorTable, only: Option<&str>) -> Result<String> {
    let countries: Vec<&str> = match only {
        Some(country) => {
            let canonical = table
                .countries()
                .find(|c| c.eq_ignore_ascii_case(country.trim()))
                .with_context(|| format!("no factors for country '{country}'"))?;
            vec![canonical]
        }
        None => table.countries().collect(),
    };

    let mut out = String::new();
    for country in countries {
        let Some(factors) = table.factors_for(country) else {
            continue;
        };
        writeln!(out, "{country}")?;
        for (category, entry) in factors {
            writeln!(out, "  {:<12} {}", category.to_string(), describe(*category, entry))?;
        }
    }
    Ok(out)
}

fn factors(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let table = match &config.factors {
        Some(path) => FactorTable::from_file(path)?,
        None => FactorTable::seed(),
    };
    print!("{}", render_table(&table, args.get_one::<String>("country").map(String::as_str))?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("calculate", args)) => calculate(args).await,
        Some(("factors", args)) => factors(args),
        _ => Ok(()),
    }
}
