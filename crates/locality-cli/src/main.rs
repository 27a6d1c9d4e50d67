mod hours;
mod nearby;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use locality_core::SortKey;
use tracing_subscriber::EnvFilter;

use crate::nearby::KindArg;

#[derive(Debug, Parser)]
#[command(name = "locality-cli")]
#[command(about = "Location-aware listing lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve listings near a city or coordinate and print them as JSON
    Nearby {
        /// Which listings to resolve
        #[arg(value_enum)]
        kind: KindArg,
        /// City substring matched against the listing and its business
        #[arg(long)]
        city: Option<String>,
        /// Reference latitude in decimal degrees
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Reference longitude in decimal degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Drop located listings farther than this many kilometres
        #[arg(long)]
        radius_km: Option<f64>,
        /// Exact category, or "all"
        #[arg(long)]
        category: Option<String>,
        /// Inclusive lower price bound
        #[arg(long)]
        min_price: Option<f64>,
        /// Inclusive upper price bound
        #[arg(long)]
        max_price: Option<f64>,
        /// newest, price-asc, price-desc, popularity or distance
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        /// Read tables from a JSON file instead of the hosted backend
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Parse free-text business hours and print the canonical schedule
    Hours {
        /// Hours text, e.g. "Mon-Fri 9am-5pm, Sat 10am-2pm"
        text: String,
        /// Also report whether the business is open at "<day> <HH:MM>"
        #[arg(long)]
        at: Option<String>,
        /// Print the parsed schedule as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Nearby {
            kind,
            city,
            lat,
            lng,
            radius_km,
            category,
            min_price,
            max_price,
            sort,
            fixtures,
        } => {
            let filter = locality_core::LocationFilter {
                city,
                latitude: lat,
                longitude: lng,
                radius_km,
                category,
                min_price,
                max_price,
                sort_key: sort,
            };
            nearby::run_nearby(kind, &filter, fixtures.as_deref()).await?;
        }
        Commands::Hours { text, at, json } => {
            hours::run_hours(&text, at.as_deref(), json)?;
        }
    }

    Ok(())
}
