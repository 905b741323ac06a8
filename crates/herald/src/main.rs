// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - a priority notifier for Telegram.
//!
//! This is the binary entry point.

mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use herald_config::{ConfigError, HeraldConfig};

/// Herald - alerts you about the Telegram messages that matter.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Without it, the standard locations are searched.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the notifier: read events, deliver alerts, answer bot commands.
    Serve,
    /// Summarise the state file without modifying it.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration, including the keys `serve` requires.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(errors) = herald_config::validate_for_serve(&config) {
                herald_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Status { json }) => {
            if let Err(e) = status::run_status(&config, json) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => match herald_config::validate_for_serve(&config) {
            Ok(()) => println!("herald: configuration is valid"),
            Err(errors) => {
                herald_config::render_errors(&errors);
                std::process::exit(1);
            }
        },
        None => {
            println!("herald: use --help for available commands");
        }
    }
}

fn load(path: Option<&std::path::Path>) -> Result<HeraldConfig, Vec<ConfigError>> {
    match path {
        Some(path) => herald_config::load_and_validate_path(path),
        None => herald_config::load_and_validate(),
    }
}
