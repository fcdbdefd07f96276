pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "logbook-api")]
#[command(about = "Logbook API - vehicle garage and maintenance logbook backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Listen port (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Look a registration up in the DVLA and DVSA registries")]
    Lookup {
        #[arg(help = "Vehicle registration, e.g. AB12CDE")]
        registration: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let config = crate::config::AppConfig::from_env();
    config.validate()?;

    match cli.command {
        Commands::Serve { port, migrate } => commands::serve::handle(config, port, migrate).await,
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Lookup { registration } => {
            commands::lookup::handle(config, &registration, output_format).await
        }
    }
}
