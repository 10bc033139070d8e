//! People directory CLI - database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! people-cli migrate
//!
//! # Load people from a YAML file
//! people-cli seed crates/cli/seed/people.yaml
//!
//! # Same, but leave people whose first and last name already exist alone
//! people-cli seed crates/cli/seed/people.yaml --skip-existing
//! ```
//!
//! Both commands read `PEOPLE_DATABASE_URL` (or `DATABASE_URL`), loading a
//! `.env` file first if one is present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "people-cli")]
#[command(author, version, about = "People directory CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create people from a YAML file
    Seed {
        /// Path to the YAML file
        file: PathBuf,

        /// Skip people whose first and last name already exist
        #[arg(long)]
        skip_existing: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            file,
            skip_existing,
        } => {
            commands::seed::people(&file, skip_existing).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_flags() {
        let cli = Cli::parse_from(["people-cli", "seed", "people.yaml", "--skip-existing"]);
        assert!(matches!(
            cli.command,
            Commands::Seed { ref file, skip_existing: true } if file.as_os_str() == "people.yaml"
        ));
    }
}
