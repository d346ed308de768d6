pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod catalog;
pub mod processing;
pub mod compare;
pub mod render;
pub mod server;
#[cfg(test)]
mod testing;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file; `config.toml` is used when present, otherwise built-in defaults
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard
    Serve,
    /// Print the comparison table for one postcode
    Compare {
        postcode: String,
        /// Dimension id; defaults to the first available dimension
        #[arg(short, long)]
        dimension: Option<String>,
    },
    /// List the selectable dimensions
    Dimensions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = config::AppConfig::resolve(cli.config.as_deref())?;

    let level = if cli.debug || app_config.server.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let source: Arc<dyn data::CensusSource> = Arc::new(data::HttpCensusSource::new(&app_config)?);

    // The dimension list is needed by every command
    let dimensions = catalog::load_dimensions(source.as_ref(), &app_config.dimensions.exclude)
        .await
        .context("Failed to load census dimensions")?;

    match cli.command {
        Commands::Serve => {
            info!("Serving dashboard with {} dimensions", dimensions.len());
            let state = server::AppState {
                config: app_config,
                dimensions,
                source,
            };
            server::start_server(state).await?;
        }
        Commands::Compare { postcode, dimension } => {
            let dimension = match dimension.or_else(|| dimensions.first().map(|d| d.id.clone())) {
                Some(dimension) => dimension,
                None => bail!("No dimensions available"),
            };

            let table = compare::compare(source.as_ref(), &app_config.api, &postcode, &dimension)
                .await?;
            match table {
                Some(table) => println!("{}", render::render_terminal_table(&table)),
                None => println!("No data for {} ({})", postcode, dimension),
            }
        }
        Commands::Dimensions => {
            for dimension in &dimensions {
                println!("{}\t{}", dimension.id, dimension.label);
            }
        }
    }

    Ok(())
}
