//! Operator CLI: run delivery-fee resolution and distance checks from the
//! command line against the same collaborators the server uses.

use anyhow::Context;
use clap::{Parser, Subcommand};

use pedeja_core::Coordinate;
use pedeja_geo::{haversine, CepClient, DeliveryFeeResolver, GeocoderClient, SettingsClient};

#[derive(Debug, Parser)]
#[command(name = "pedeja-cli")]
#[command(about = "pedeja delivery-core command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve deliverability and fee for a CEP against a store's geofence.
    Quote {
        /// Store slug whose delivery settings to use.
        #[arg(long)]
        store: String,
        /// Customer CEP, with or without formatting.
        #[arg(long)]
        cep: String,
    },
    /// Straight-line distance between two coordinates, offline.
    Distance {
        /// Origin as "lat,lon".
        #[arg(long)]
        from: String,
        /// Destination as "lat,lon".
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Quote { store, cep } => quote(&store, &cep).await,
        Commands::Distance { from, to } => {
            let from = parse_coordinate(&from)?;
            let to = parse_coordinate(&to)?;
            let output = serde_json::json!({
                "distance_km": haversine::distance_km(from, to),
            });
            println!("{output:#}");
            Ok(())
        }
    }
}

async fn quote(store: &str, cep: &str) -> anyhow::Result<()> {
    let config = pedeja_core::load_app_config()?;

    let cep_client = CepClient::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.cep_base_url,
    )?;
    let geocoder = GeocoderClient::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.geocoder_base_url,
    )?;
    let settings = SettingsClient::new(
        &config.upstream_base_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let resolver = DeliveryFeeResolver::new(cep_client, geocoder, config.geofence_enforcement);

    let store_settings = settings
        .fetch(store)
        .await
        .with_context(|| format!("fetching settings for store '{store}'"))?;
    let decision = resolver.resolve(&store_settings.delivery, cep).await?;

    let output = serde_json::to_value(&decision)?;
    println!("{output:#}");
    Ok(())
}

fn parse_coordinate(raw: &str) -> anyhow::Result<Coordinate> {
    let (lat, lon) = raw
        .split_once(',')
        .with_context(|| format!("expected 'lat,lon', got '{raw}'"))?;
    Ok(Coordinate {
        latitude: lat.trim().parse().context("latitude is not a number")?,
        longitude: lon.trim().parse().context("longitude is not a number")?,
    })
}
