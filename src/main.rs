use std::path::PathBuf;
use std::sync::Arc;

use aerosense::config::GeolocationMode;
use aerosense::geolocation::FixedPosition;
use aerosense::map::{sensor_stations, stations_near};
use aerosense::web::{self, PageShell};
use aerosense::{AeroSense, AeroSenseConfig, AeroSenseError, ClassificationPolicy, Location};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aerosense", version)]
#[command(about = "Aero-Sense: pollen and air quality risk assessment from NASA POWER or simulated readings")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "AEROSENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample the location and print a risk assessment
    Assess {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Skip the remote data source and simulate
        #[arg(long)]
        offline: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Override the configured classification policy (weighted or union)
        #[arg(long)]
        policy: Option<ClassificationPolicy>,
    },
    /// List the sensor stations near a location
    Sensors {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = 50.0)]
        radius_km: f64,
    },
    /// Resolve the current location
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Serve the map page and HTML fragments
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Location>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(Location::checked(lat, lon)?)),
        _ => Ok(None),
    }
}

/// Explicit coordinates replace geolocation for this run
fn build_service(config: &AeroSenseConfig, position: Option<Location>) -> Result<AeroSense> {
    let service = AeroSense::from_config(config)?;
    Ok(match position {
        Some(location) => service.with_geolocation(Box::new(FixedPosition(location))),
        None => service,
    })
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        if let Some(app_error) = e.chain().find_map(|c| c.downcast_ref::<AeroSenseError>()) {
            eprintln!("{}", app_error.user_message());
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AeroSenseConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    aerosense::logging::init(&config.logging, cli.verbose)?;
    tracing::debug!(config_path = ?cli.config, "Configuration loaded");

    match cli.command {
        Command::Assess {
            lat,
            lon,
            offline,
            json,
            policy,
        } => {
            if offline {
                config.remote.enabled = false;
                config.location.geolocation = GeolocationMode::Disabled;
            }
            let position = coordinates(lat, lon)?;
            let explicit_position = position.is_some();
            let mut service = build_service(&config, position)?;
            if let Some(policy) = policy {
                service = service.with_policy(policy);
            }

            if offline && !explicit_position {
                // no lookup at all, so no denial notice
                eprintln!(
                    "Offline: simulated readings for the default location ({})",
                    config.location.default_name
                );
            } else {
                let fix = service.locate().await;
                if let Some(notice) = fix.notice {
                    eprintln!("{notice}");
                }
            }
            let report = service.assess().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let sample = &report.sample;
                let assessment = &report.assessment;
                println!("Aero-Sense assessment for {}", sample.location().label());
                println!("  Source:        {}", sample.provenance().as_str());
                println!("  Temperature:   {:.1} °C", sample.temperature());
                println!("  Humidity:      {:.0} %", sample.humidity());
                println!("  Pollen index:  {:.0}", sample.pollen_index());
                println!("  PM2.5:         {:.1} µg/m³", sample.pm25());
                println!("  UV index:      {}", sample.uv_index());
                println!("  Wind speed:    {:.1} km/h", sample.wind_speed());
                println!("  Air pressure:  {:.0} hPa", sample.air_pressure());
                if let Some(no2) = sample.no2() {
                    println!("  NO2:           {no2:.0} ppb");
                }
                println!(
                    "Risk: {} (score {:.1}, {} policy)",
                    assessment.level, assessment.score, assessment.policy
                );
                println!("{}", assessment.recommendation);
            }
        }
        Command::Sensors {
            lat,
            lon,
            radius_km,
        } => {
            let center = coordinates(lat, lon)?.unwrap_or_default();
            let stations = sensor_stations();
            let nearby = stations_near(&center, radius_km, &stations);
            println!(
                "Found {} sensor stations within {}km of {}:",
                nearby.len(),
                radius_km,
                center.label()
            );
            for (station, distance) in &nearby {
                let assessment = station.assess(config.classifier.policy);
                println!(
                    "  - {} ({:.1}km away) pollen {:.0}, PM2.5 {:.0}: {}",
                    station.name, distance, station.pollen_index, station.pm25, assessment.level
                );
            }
        }
        Command::Locate { lat, lon } => {
            let service = build_service(&config, coordinates(lat, lon)?)?;
            let fix = service.locate().await;
            println!("{}", fix.location.format_coordinates());
            if let Some(notice) = fix.notice {
                eprintln!("{notice}");
            }
        }
        Command::Serve { port } => {
            // missing page containers are fatal at startup
            let page = match &config.web.page_path {
                Some(path) => PageShell::from_path(path)
                    .with_context(|| format!("Failed to read page shell {}", path.display()))?,
                None => PageShell::embedded()?,
            };
            let service = Arc::new(build_service(&config, None)?);
            let port = port.unwrap_or(config.web.port);
            web::run(service, page, &config.web.bind, port).await?;
        }
    }

    Ok(())
}
