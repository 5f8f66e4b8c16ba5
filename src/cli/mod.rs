pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "warehouse-api")]
#[command(about = "Warehouse API - locations, storages, containers and items with per-location roles")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides WAREHOUSE_API_PORT / PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Normalize and validate an entity code")]
    ValidateCode {
        #[arg(help = "Raw code, e.g. \"AB 12\"")]
        raw: String,
    },

    #[command(about = "Export a location's full subtree as the given user")]
    Export {
        #[arg(help = "Location code")]
        location: String,
        #[arg(long, help = "User id to act as")]
        user: String,
        #[arg(long, short, help = "Write to this file instead of stdout")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let mut config = AppConfig::from_env();
            if let Some(port) = port {
                config.api.port = port;
            }
            commands::serve::handle(config).await
        }
        Commands::ValidateCode { raw } => commands::code::handle(&raw, output_format),
        Commands::Export { location, user, output } => {
            commands::export::handle(AppConfig::from_env(), &location, &user, output).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["warehouse-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_export_arguments() {
        let cli = Cli::try_parse_from([
            "warehouse-api",
            "export",
            "LOC-1",
            "--user",
            "user-1",
            "-o",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Export { location, user, output }) => {
                assert_eq!(location, "LOC-1");
                assert_eq!(user, "user-1");
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn export_requires_a_user() {
        assert!(Cli::try_parse_from(["warehouse-api", "export", "LOC-1"]).is_err());
    }
}
