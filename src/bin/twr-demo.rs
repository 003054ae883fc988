#![cfg(feature = "demo")]
use std::fs;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use timewindow_resolver::time::clock::ClockProvider;
use timewindow_resolver::window::{
    comparison_window, create_subscription_timewindow, ComparisonSpec, ComparisonUnit, DefaultLimitPolicy, Timewindow,
};
use timewindow_resolver::init;

#[derive(Parser)]
#[command(author, version, about = "Resolve a widget time window", long_about = None)]
struct Cli {
    /// Path to configuration file (resolver.toml)
    #[arg(long)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a Timewindow JSON file
    Resolve {
        /// Timewindow JSON file
        #[arg(long)]
        timewindow: String,
        /// Request raw state transitions instead of aggregates
        #[arg(long, default_value_t = false)]
        state_data: bool,
        /// Comparison: previous, custom:<ms>, day, week, month or year
        #[arg(long)]
        compare: Option<String>,
    },
    /// List known timezones with their current offsets
    Timezones,
}

fn parse_comparison(value: &str) -> anyhow::Result<ComparisonSpec> {
    if value.eq_ignore_ascii_case("previous") {
        return Ok(ComparisonSpec::PreviousInterval);
    }
    if let Some(ms) = value.strip_prefix("custom:") {
        let ms = ms.parse::<i64>().with_context(|| format!("invalid custom offset '{}'", ms))?;
        return Ok(ComparisonSpec::CustomInterval(ms));
    }
    match ComparisonUnit::from_str(value) {
        Ok(unit) => Ok(ComparisonSpec::Calendar(unit)),
        Err(_) => bail!("unknown comparison '{}'", value),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = init(cli.config.as_deref())?;
    let clock = match &config.timezone.default {
        Some(id) => ClockProvider::system().with_default_timezone(id)?,
        None => ClockProvider::system(),
    };

    match cli.command {
        Commands::Resolve { timewindow, state_data, compare } => {
            let raw = fs::read_to_string(&timewindow).with_context(|| format!("reading {}", timewindow))?;
            let tw = Timewindow::from_json(&raw)?;
            let policy = DefaultLimitPolicy::from_config(&config.limits);
            let resolved = create_subscription_timewindow(&tw, state_data, &clock, &policy)?;
            let comparison = match compare {
                Some(spec) => Some(comparison_window(&resolved, &parse_comparison(&spec)?, &clock)?),
                None => None,
            };
            let out = json!({ "window": resolved, "comparison": comparison });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Timezones => {
            println!("local:   {}", clock.local_timezone());
            println!("default: {}", clock.default_timezone());
            for info in clock.list_timezones() {
                println!("{:<10} {:<6} {}", info.utc_offset, info.abbreviation, info.id);
            }
        }
    }
    Ok(())
}
