pub mod types;
pub mod error;
pub mod config;
pub mod geometry;
pub mod data;
pub mod processing;
pub mod presentation;
pub mod html;
pub mod render;
pub mod export;
pub mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Render a static PNG snapshot of the map
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Minimum number of deaths for a marker (defaults to the slider default)
        #[arg(short, long)]
        threshold: Option<i64>,
        #[arg(long)]
        hide_pumps: bool,
        #[arg(short, long, value_name = "PNG", default_value = "snapshot.png")]
        output: PathBuf,
    },
    /// Export the filtered deaths and pumps as GeoJSON
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long)]
        threshold: Option<i64>,
        #[arg(long)]
        hide_pumps: bool,
        #[arg(short, long, value_name = "GEOJSON", default_value = "cholera.geojson")]
        output: PathBuf,
    },
}

fn resolve_threshold(
    app_config: &config::AppConfig,
    threshold: Option<i64>,
) -> anyhow::Result<processing::Threshold> {
    match threshold {
        Some(value) => Ok(processing::Threshold::new(value, &app_config.controls)?),
        None => Ok(processing::Threshold::default_for(&app_config.controls)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // Loaded once and shared read-only by every request.
            let observations = data::load_data(&app_config)?;

            server::start_server(app_config, observations).await?;
        }
        Commands::Render { config, threshold, hide_pumps, output } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let threshold = resolve_threshold(&app_config, *threshold)?;
            let observations = data::load_data(&app_config)?;

            let partition = processing::partition(&observations, threshold, !hide_pumps);
            let img = render::render_snapshot(&app_config, &partition);
            render::save_snapshot(&img, output)?;
        }
        Commands::Export { config, threshold, hide_pumps, output } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let threshold = resolve_threshold(&app_config, *threshold)?;
            let observations = data::load_data(&app_config)?;

            let partition = processing::partition(&observations, threshold, !hide_pumps);
            let collection = export::to_feature_collection(&partition);
            export::write_geojson(output, &collection)?;
        }
    }

    Ok(())
}
