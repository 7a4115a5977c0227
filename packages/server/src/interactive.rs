//! Interactive mode for the server.
//!
//! Prompts the user for the data file, bind address and port before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::DashboardConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// `config` supplies the prompt defaults; the answers override it before
/// delegating to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: DashboardConfig) -> std::io::Result<()> {
    println!("Traffic Accident Dashboard Server");
    println!();

    let default_data = config.data_path.display().to_string();
    let data_path: String = Input::new()
        .with_prompt("Accident CSV")
        .default(default_data.clone())
        .interact_text()
        .unwrap_or(default_data);
    config.data_path = PathBuf::from(data_path);

    let default_bind = config.bind_addr.clone();
    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(default_bind.clone())
        .interact_text()
        .unwrap_or(default_bind);

    let default_port = config.port;
    config.port = Input::<u16>::new()
        .with_prompt("Port")
        .default(default_port)
        .interact_text()
        .unwrap_or(default_port);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.bind_addr, config.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
