#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone server binary for the traffic accident dashboard.

use accident_dashboard_server::{ConfigArgs, interactive, run_server};
use clap::Parser;

/// Serves the traffic accident dashboard over HTTP.
#[derive(Parser, Debug)]
#[command(name = "accident_dashboard_server", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Prompt for the data file, bind address and port
    #[arg(long, short)]
    interactive: bool,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let config = cli.config.resolve()?;

    if cli.interactive {
        interactive::run(config).await?;
    } else {
        run_server(config).await?;
    }

    Ok(())
}
