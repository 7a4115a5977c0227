#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the traffic accident dashboard.
//!
//! `serve` starts the HTTP dashboard, `summary` prints the metrics and
//! aggregate views, and `render` writes the dashboard page to a
//! standalone HTML file. Run without a subcommand to pick one
//! interactively.

mod report;

use std::path::PathBuf;

use accident_dashboard_analytics::aggregate;
use accident_dashboard_server::{AppState, ConfigArgs, interactive, run_server};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};

#[derive(Parser)]
#[command(
    name = "accident_dashboard",
    about = "Traffic accident dashboard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP dashboard server
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Prompt for the data file, bind address and port
        #[arg(long, short)]
        interactive: bool,
    },
    /// Print the metrics and aggregate views
    Summary {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Write the dashboard page to a standalone HTML file
    Render {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output HTML file
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
}

/// Tools offered when no subcommand is given.
enum Tool {
    Serve,
    Summary,
    Render,
}

impl Tool {
    const ALL: &[Self] = &[Self::Serve, Self::Summary, Self::Render];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Serve => "Start server",
            Self::Summary => "Print summary",
            Self::Render => "Render dashboard to HTML",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let command = match cli.command {
        Some(command) => command,
        None => select_command()?,
    };

    match command {
        Commands::Serve {
            config,
            interactive: prompt,
        } => {
            let config = config.resolve()?;
            actix_web::rt::System::new().block_on(async move {
                if prompt {
                    interactive::run(config).await
                } else {
                    run_server(config).await
                }
            })?;
        }
        Commands::Summary { config } => {
            let state = AppState::new(config.resolve()?);
            let table = state.table()?;
            print!("{}", report::format_summary(&aggregate(&table)));
        }
        Commands::Render { config, output } => {
            let state = AppState::new(config.resolve()?);
            let html = state.render_html()?;
            std::fs::write(&output, html)?;
            log::info!("Wrote dashboard to {}", output.display());
        }
    }

    Ok(())
}

fn select_command() -> Result<Commands, Box<dyn std::error::Error>> {
    println!("Traffic Accident Dashboard");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(match Tool::ALL[idx] {
        Tool::Serve => Commands::Serve {
            config: ConfigArgs::default(),
            interactive: true,
        },
        Tool::Summary => Commands::Summary {
            config: ConfigArgs::default(),
        },
        Tool::Render => {
            let output: String = Input::new()
                .with_prompt("Output file")
                .default("dashboard.html".to_string())
                .interact_text()?;
            Commands::Render {
                config: ConfigArgs::default(),
                output: PathBuf::from(output),
            }
        }
    })
}
